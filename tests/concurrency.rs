use std::{collections::HashSet, sync::Arc, time::Duration};

use futures::future;
use rand::Rng as _;
use screenplay_report::{
    Actor, Failure, JsonArtifact, Outcome, PerformanceId, PerformancePhase,
    ReportValue, Screenplay, ScreenplayOptions, ScreenplayReport,
    report::{NamingItem, PerformanceReport},
};
use tokio::time;

const PERFORMANCES: usize = 24;

#[derive(Debug)]
struct Errand;

impl ReportValue for Errand {}

#[derive(Debug)]
struct Step;

impl ReportValue for Step {}

/// Runs a performance of two nested steps with random pauses, failing the
/// second step of every third performance.
async fn perform(
    screenplay: Screenplay,
    id: Option<PerformanceId>,
    index: usize,
    pauses: [Duration; 3],
) {
    let naming = vec![NamingItem::new(index.to_string(), None)];
    let performance = match id {
        Some(id) => screenplay.begin_performance_as(id, naming),
        None => screenplay.begin_performance(naming),
    };
    let actor = Actor::named(format!("Actor {index}"));
    performance.actor_created(&actor);

    let result = performance
        .perform(&actor, Arc::new(Errand), PerformancePhase::When, async {
            for (step, pause) in pauses.into_iter().enumerate().skip(1) {
                let execution = async {
                    time::sleep(pause).await;
                    if step == 2 && index % 3 == 0 {
                        let message = format!("step of {index} failed");
                        return Err(Failure::new(message));
                    }
                    Ok(())
                };
                let step = Arc::new(Step);
                performance
                    .perform(&actor, step, PerformancePhase::When, execution)
                    .await?;
            }
            Ok::<_, Failure>(())
        })
        .await;
    time::sleep(pauses[0]).await;

    performance.finish(Some(result.is_ok()));
}

fn screenplay() -> Screenplay {
    Screenplay::new(&ScreenplayOptions::default().report_path(None::<&str>))
}

fn random_pauses() -> Vec<[Duration; 3]> {
    let mut rng = rand::thread_rng();
    (0..PERFORMANCES)
        .map(|_| {
            [(); 3].map(|()| Duration::from_millis(rng.gen_range(0..20)))
        })
        .collect()
}

fn check(performance: &PerformanceReport) {
    let index = performance.naming_hierarchy[0]
        .identifier
        .parse::<usize>()
        .unwrap();
    let actor = format!("Actor {index}");
    let fails = index % 3 == 0;

    assert_eq!(
        performance.outcome,
        if fails { Outcome::Failed } else { Outcome::Success },
    );
    assert_eq!(performance.reportables.len(), 2);
    assert_eq!(performance.reportables[0].actor_name(), Some(actor.as_str()));

    let errand = performance.reportables[1].as_performable().unwrap();
    assert_eq!(errand.report, format!("{actor} performed Errand"));
    assert_eq!(errand.reportables.len(), 2);
    for step in &errand.reportables {
        assert_eq!(step.actor_name(), Some(actor.as_str()));
        assert!(step.as_performable().unwrap().reportables.is_empty());
    }

    let second = errand.reportables[1].as_performable().unwrap();
    if fails {
        let message = format!("step of {index} failed");
        assert_eq!(second.exception.as_deref(), Some(message.as_str()));
        assert!(!second.exception_is_from_consumed_performable);
        assert_eq!(errand.exception.as_deref(), Some(message.as_str()));
        assert!(errand.exception_is_from_consumed_performable);
    } else {
        assert_eq!(second.exception, None);
        assert_eq!(errand.exception, None);
    }
}

fn check_all(report: &ScreenplayReport) {
    assert_eq!(report.performances.len(), PERFORMANCES);

    let indices = report
        .performances
        .iter()
        .map(|p| p.naming_hierarchy[0].identifier.clone())
        .collect::<HashSet<_>>();
    assert_eq!(indices.len(), PERFORMANCES);

    report.performances.iter().for_each(check);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_reporter_keeps_interleaved_performances_apart() {
    let screenplay = screenplay();
    let reporter = screenplay.reporter(Vec::<u8>::new());

    let run = async {
        screenplay.begin();
        let tasks = random_pauses()
            .into_iter()
            .enumerate()
            .map(|(i, pauses)| {
                tokio::spawn(perform(screenplay.clone(), None, i, pauses))
            })
            .collect::<Vec<_>>();
        for task in future::join_all(tasks).await {
            task.unwrap();
        }
        screenplay.end();
    };
    let (reporter, ()) = tokio::join!(reporter, run);

    assert!(reporter.errors().is_empty(), "{:?}", reporter.errors());
    assert_eq!(reporter.open_performances().count(), 0);
    let artifact = Arc::clone(reporter.artifact());
    drop(reporter);
    let output = Arc::into_inner(artifact).unwrap().into_output();

    check_all(&ScreenplayReport::from_slice(&output).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reporters_per_performance_share_one_artifact() {
    let screenplay = screenplay();
    let artifact = Arc::new(JsonArtifact::new(Vec::<u8>::new()));

    let ids =
        (0..PERFORMANCES).map(|_| PerformanceId::new()).collect::<Vec<_>>();
    let reporters = ids
        .iter()
        .map(|id| screenplay.performance_reporter(*id, Arc::clone(&artifact)))
        .collect::<Vec<_>>();

    let run = async {
        screenplay.begin();
        let tasks = random_pauses()
            .into_iter()
            .zip(&ids)
            .enumerate()
            .map(|(i, (pauses, id))| {
                tokio::spawn(perform(screenplay.clone(), Some(*id), i, pauses))
            })
            .collect::<Vec<_>>();
        for task in future::join_all(tasks).await {
            task.unwrap();
        }
        screenplay.end();
    };
    let (reporters, ()) = tokio::join!(future::join_all(reporters), run);

    for reporter in &reporters {
        assert!(reporter.errors().is_empty(), "{:?}", reporter.errors());
    }
    assert!(artifact.is_completed());
    assert_eq!(artifact.performances_written(), PERFORMANCES);
    drop(reporters);
    let output = Arc::into_inner(artifact).unwrap().into_output();

    check_all(&ScreenplayReport::from_slice(&output).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_performance_is_completed() {
    let screenplay = screenplay();
    let reporter = screenplay.reporter(Vec::<u8>::new());

    let run = async {
        screenplay.begin();
        let task = tokio::spawn({
            let screenplay = screenplay.clone();
            async move {
                let naming = vec![NamingItem::new("slow", None)];
                let performance = screenplay.begin_performance(naming);
                performance
                    .perform(
                        &Actor::named("Joe"),
                        Arc::new(Errand),
                        PerformancePhase::When,
                        async {
                            time::sleep(Duration::from_secs(60)).await;
                            Ok(())
                        },
                    )
                    .await
            }
        });
        time::sleep(Duration::from_millis(50)).await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        screenplay.end();
    };
    let (reporter, ()) = tokio::join!(reporter, run);

    assert!(reporter.errors().is_empty(), "{:?}", reporter.errors());
    let artifact = Arc::clone(reporter.artifact());
    drop(reporter);
    let output = Arc::into_inner(artifact).unwrap().into_output();
    let report = ScreenplayReport::from_slice(&output).unwrap();

    assert_eq!(report.performances.len(), 1);
    let performance = &report.performances[0];
    assert_eq!(performance.outcome, Outcome::Completed);
    let errand = performance.reportables[0].as_performable().unwrap();
    assert_eq!(errand.report, "Joe performed Errand");
}

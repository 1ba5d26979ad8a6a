mod support;

use std::time::Duration;

use forex_agents::{
    AnalysisError, AnalysisPipeline, Cause, ChannelProgress, CollectingProgress, CurrencyPair,
    PipelineState, ProgressEvent, Stage, StageStatus,
};
use support::{StubNews, StubRates, StubSynth};

use PipelineState::*;

fn pair(s: &str) -> CurrencyPair {
    s.parse().unwrap()
}

#[tokio::test]
async fn end_to_end_report_from_mocked_stages() {
    let pipeline = AnalysisPipeline::new(
        StubRates::with_rates(&[("EUR/USD", 1.0850)]),
        StubNews::articles(2),
        StubSynth::fixed("Narrative X"),
    );

    let report = pipeline.run_analysis(&pair("EUR/USD")).await.unwrap();

    assert_eq!(report.pair, pair("EUR/USD"));
    assert_eq!(report.rate.rate, 1.0850);
    assert_eq!(report.articles.len(), 2);
    assert_eq!(report.narrative, "Narrative X");
    assert!(report.generated_at >= report.rate.fetched_at);
}

#[tokio::test]
async fn successful_run_walks_every_state_in_order() {
    let pipeline = AnalysisPipeline::new(
        StubRates::with_rates(&[("EUR/USD", 1.0850)]),
        StubNews::articles(1),
        StubSynth::fixed("ok"),
    );
    let progress = CollectingProgress::new();

    pipeline.run_with_progress(&pair("EUR/USD"), &progress).await.unwrap();

    assert_eq!(progress.states(), vec![Idle, FetchingRate, FetchingNews, Synthesizing, Complete]);

    let stage_events: Vec<_> = progress
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ProgressEvent::Stage { stage, status } => Some((stage, status)),
            _ => None,
        })
        .collect();
    assert_eq!(
        stage_events,
        vec![
            (Stage::Rate, StageStatus::Started),
            (Stage::Rate, StageStatus::Completed),
            (Stage::News, StageStatus::Started),
            (Stage::News, StageStatus::Completed),
            (Stage::Synthesis, StageStatus::Started),
            (Stage::Synthesis, StageStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn rate_failure_stops_the_run() {
    let news = StubNews::articles(2);
    let synth = StubSynth::fixed("never");
    let (news_calls, synth_calls) = (news.calls.clone(), synth.calls.clone());
    let pipeline = AnalysisPipeline::new(StubRates::failing(Cause::Timeout), news, synth);
    let progress = CollectingProgress::new();

    let err = pipeline.run_with_progress(&pair("EUR/USD"), &progress).await.unwrap_err();

    assert_eq!(err.stage, Stage::Rate);
    assert_eq!(err.source, AnalysisError::RateUnavailable(Cause::Timeout));
    assert_eq!(progress.states(), vec![Idle, FetchingRate, Failed]);
    assert_eq!(news_calls.count(), 0);
    assert_eq!(synth_calls.count(), 0);
}

#[tokio::test]
async fn news_failure_never_reaches_synthesis() {
    let synth = StubSynth::fixed("never");
    let synth_calls = synth.calls.clone();
    let pipeline = AnalysisPipeline::new(
        StubRates::with_rates(&[("USD/INR", 83.2)]),
        StubNews::failing(Cause::Auth("apiKeyInvalid".into())),
        synth,
    );
    let progress = CollectingProgress::new();

    let err = pipeline.run_with_progress(&pair("USD/INR"), &progress).await.unwrap_err();

    assert_eq!(err.stage, Stage::News);
    assert!(matches!(err.source, AnalysisError::NewsUnavailable(Cause::Auth(_))));
    assert_eq!(progress.states(), vec![Idle, FetchingRate, FetchingNews, Failed]);
    assert_eq!(synth_calls.count(), 0);
}

#[tokio::test]
async fn synthesis_failure_ends_failed_not_complete() {
    let pipeline = AnalysisPipeline::new(
        StubRates::with_rates(&[("USD/INR", 83.2)]),
        StubNews::articles(3),
        StubSynth::failing(Cause::Empty("completion contained no text".into())),
    );
    let progress = CollectingProgress::new();

    let err = pipeline.run_with_progress(&pair("USD/INR"), &progress).await.unwrap_err();

    assert_eq!(err.stage, Stage::Synthesis);
    assert!(matches!(err.source, AnalysisError::SynthesisUnavailable(Cause::Empty(_))));
    let states = progress.states();
    assert_eq!(states.last(), Some(&Failed));
    assert!(!states.contains(&Complete));
    assert!(err.to_string().starts_with("synthesis stage failed"));
}

#[tokio::test]
async fn no_news_still_produces_a_report() {
    let pipeline = AnalysisPipeline::new(
        StubRates::with_rates(&[("CHF/JPY", 171.4)]),
        StubNews::articles(0),
        StubSynth::echo(),
    );

    let report = pipeline.run_analysis(&pair("CHF/JPY")).await.unwrap();

    assert!(report.articles.is_empty());
    assert_eq!(report.narrative, "CHF/JPY at 171.4 with 0 articles");
}

#[tokio::test]
async fn concurrent_runs_do_not_share_data() {
    let pipeline = AnalysisPipeline::new(
        StubRates::with_rates(&[("USD/EUR", 0.9215), ("GBP/JPY", 195.37)])
            .delayed(Duration::from_millis(40)),
        StubNews::articles(2).delayed(Duration::from_millis(20)),
        StubSynth::echo(),
    );
    let (usd_eur, gbp_jpy) = (pair("USD/EUR"), pair("GBP/JPY"));

    let (a, b) = tokio::join!(pipeline.run_analysis(&usd_eur), pipeline.run_analysis(&gbp_jpy));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.pair, usd_eur);
    assert_eq!(a.rate.rate, 0.9215);
    assert!(a.articles.iter().all(|art| art.title.starts_with("USD/EUR")));
    assert_eq!(a.narrative, "USD/EUR at 0.9215 with 2 articles");

    assert_eq!(b.pair, gbp_jpy);
    assert_eq!(b.rate.rate, 195.37);
    assert!(b.articles.iter().all(|art| art.title.starts_with("GBP/JPY")));
    assert_eq!(b.narrative, "GBP/JPY at 195.37 with 2 articles");
}

#[tokio::test]
async fn channel_sink_streams_progress() {
    let pipeline = AnalysisPipeline::new(
        StubRates::with_rates(&[("EUR/USD", 1.0850)]),
        StubNews::articles(1),
        StubSynth::fixed("ok"),
    );
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let sink = ChannelProgress::new(tx);

    pipeline.run_with_progress(&pair("EUR/USD"), &sink).await.unwrap();
    drop(sink);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(events.first(), Some(&ProgressEvent::Transition { from: Idle, to: FetchingRate }));
    assert_eq!(events.last(), Some(&ProgressEvent::Transition { from: Synthesizing, to: Complete }));
    assert_eq!(events.len(), 10);
}

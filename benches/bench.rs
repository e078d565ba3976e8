//! Criterion benchmarks for chatscore.
//!
//! Covers the per-message scorers, the async pipeline fan-out and
//! conversation clustering.

use std::hint::black_box;

use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use chatscore::analysis::analyzer::{Analyzer, StandardAnalyzer};
use chatscore::ml::MessageContext;
use chatscore::ml::anomaly::{AnomalyConfig, AnomalyDetector};
use chatscore::ml::clustering::{ClusteringConfig, Conversation, ConversationClusterer};
use chatscore::ml::intent_classifier::{IntentClassifier, IntentConfig};
use chatscore::ml::pipeline::{MLPipeline, PipelineConfig, ScoredMessage};
use chatscore::ml::sentiment::{SentimentConfig, SentimentScorer};

/// Generate chat-like messages for benchmarking.
fn generate_test_messages(count: usize) -> Vec<String> {
    let openers = [
        "Hi there",
        "I need help",
        "This is terrible",
        "Thanks so much",
        "Quick question",
        "URGENT",
    ];
    let bodies = [
        "my order has not arrived yet and it has been two weeks",
        "how much does the premium plan cost per month",
        "I want to buy the new laptop, is it in stock",
        "the app keeps crashing when I open settings",
        "can I get a refund for the duplicate charge",
        "great service, the support team was amazing",
    ];

    (0..count)
        .map(|i| {
            format!(
                "{} {} #{i}",
                openers[i % openers.len()],
                bodies[(i * 7) % bodies.len()]
            )
        })
        .collect()
}

fn generate_conversations(count: usize) -> Vec<Conversation> {
    generate_test_messages(count)
        .into_iter()
        .map(|question| Conversation::new(question, "Thanks, we are looking into it."))
        .collect()
}

/// Benchmark text analysis.
fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");

    let analyzer = StandardAnalyzer::new();
    let texts = generate_test_messages(100);

    group.throughput(Throughput::Elements(100));
    group.bench_function("analyze_messages", |b| {
        b.iter(|| {
            for text in &texts {
                let _ = black_box(analyzer.terms(black_box(text)));
            }
        })
    });

    group.finish();
}

/// Benchmark the individual per-message scorers.
fn bench_scorers(c: &mut Criterion) {
    let mut group = c.benchmark_group("scorers");

    let messages = generate_test_messages(100);
    let sentiment = SentimentScorer::new(SentimentConfig::default()).unwrap();
    let intent = IntentClassifier::new(IntentConfig::default()).unwrap();
    let anomaly = AnomalyDetector::new(AnomalyConfig::default()).unwrap();

    group.bench_function("sentiment", |b| {
        b.iter(|| black_box(sentiment.analyze(black_box(&messages[0]))))
    });

    group.bench_function("intent", |b| {
        b.iter(|| black_box(intent.classify(black_box(&messages[1]))))
    });

    group.bench_function("anomaly_anonymous", |b| {
        let context = MessageContext::default();
        b.iter(|| black_box(anomaly.detect(black_box(&messages[2]), &context)))
    });

    let start = Utc::now();
    let mut tick = 0i64;
    group.bench_function("anomaly_with_history", |b| {
        b.iter(|| {
            tick += 1;
            let context =
                MessageContext::for_user("bench_user", start + Duration::milliseconds(tick * 50));
            black_box(anomaly.detect(black_box(&messages[3]), &context))
        })
    });

    group.bench_function("intent_model_training", |b| {
        b.iter(|| black_box(IntentClassifier::new(IntentConfig::default()).unwrap()))
    });

    group.finish();
}

/// Benchmark the async pipeline fan-out.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let pipeline = MLPipeline::new(PipelineConfig::default()).unwrap();
    let batch: Vec<ScoredMessage> = generate_test_messages(50)
        .into_iter()
        .enumerate()
        .map(|(i, message)| {
            ScoredMessage::new(
                message,
                MessageContext::for_user(format!("user_{}", i % 10), Utc::now()),
            )
        })
        .collect();

    group.bench_function("analyze_message", |b| {
        b.iter(|| {
            runtime.block_on(
                pipeline.analyze_message(black_box(&batch[0].message), MessageContext::default()),
            )
        })
    });

    group.throughput(Throughput::Elements(batch.len() as u64));
    group.bench_function("analyze_batch", |b| {
        b.iter(|| black_box(runtime.block_on(pipeline.analyze_batch(black_box(&batch)))))
    });

    group.finish();
}

/// Clustering cost grows quadratically with the number of conversations.
fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");
    group.sample_size(10);

    let clusterer = ConversationClusterer::new(ClusteringConfig::default()).unwrap();
    for size in [25, 100, 200] {
        let conversations = generate_conversations(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("cluster", size), &conversations, |b, input| {
            b.iter(|| black_box(clusterer.cluster(black_box(input)).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_text_analysis, bench_scorers, bench_pipeline);

// Separate group for slower benchmarks
criterion_group!(slow_benches, bench_clustering);

criterion_main!(benches, slow_benches);

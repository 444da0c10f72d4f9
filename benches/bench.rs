//! Criterion benchmarks for Taxis.
//!
//! Covers the hot paths of a classification run:
//! - Text preprocessing
//! - Model training and classifier fitting
//! - Classification throughput of every strategy

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use taxis::prelude::*;

const CATEGORIES: [&str; 4] = ["sports", "politics", "science", "finance"];

/// Generate labeled documents with a category dependent vocabulary bias.
fn generate_test_documents(count: usize) -> Vec<(String, Category)> {
    let words = [
        "match", "team", "goal", "season", "vote", "party", "law", "court", "cell", "energy",
        "theory", "experiment", "market", "price", "stock", "bank", "the", "of", "new", "report",
        "week", "city", "people", "year",
    ];

    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let category = i % CATEGORIES.len();
        let doc_length = 20 + (i % 40); // Variable length documents
        let mut doc_words = Vec::with_capacity(doc_length);
        for j in 0..doc_length {
            // Every other word comes from the category's own slice.
            let word_idx = if j % 2 == 0 {
                category * 4 + (i + j) % 4
            } else {
                16 + (i * 7 + j * 13) % 8
            };
            doc_words.push(words[word_idx]);
        }
        documents.push((doc_words.join(" "), Category::new(CATEGORIES[category])));
    }
    documents
}

fn tables(documents: &[(String, Category)]) -> Vec<(FrequencyTable<String>, Category)> {
    let tokenizer = WordTokenizer::new();
    documents
        .iter()
        .map(|(text, category)| (tokenizer.frequencies(text), category.clone()))
        .collect()
}

fn train<F: ClassifierFactory<String>>(factory: &F, documents: &[(FrequencyTable<String>, Category)]) -> F::Model {
    let mut model = factory.build_model();
    for (document, category) in documents {
        model.train(document, category);
    }
    model
}

/// Benchmark text preprocessing.
fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    let documents = generate_test_documents(100);
    let words = WordTokenizer::new();
    let bigrams = NGramTokenizer::new(2).unwrap();

    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("word_tokenizer", |b| {
        b.iter(|| {
            for (text, _) in &documents {
                black_box(words.frequencies(black_box(text)));
            }
        })
    });
    group.bench_function("bigram_tokenizer", |b| {
        b.iter(|| {
            for (text, _) in &documents {
                black_box(bigrams.frequencies(black_box(text)));
            }
        })
    });

    group.finish();
}

/// Benchmark training a model and fitting a classifier from it.
fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(20);
    let documents = tables(&generate_test_documents(400));
    group.throughput(Throughput::Elements(documents.len() as u64));

    let bayes = BayesianClassifierFactory::new();
    group.bench_function("bayesian", |b| {
        b.iter(|| {
            let mut model = train(&bayes, &documents);
            black_box(bayes.classifier(&mut model).unwrap())
        })
    });

    let tfidf = TfIdfClassifierFactory::new();
    group.bench_function("tfidf", |b| {
        b.iter(|| {
            let mut model = train(&tfidf, &documents);
            black_box(tfidf.classifier(&mut model).unwrap())
        })
    });

    let c45 = C45ClassifierFactory::new();
    group.bench_function("c45", |b| {
        b.iter(|| {
            let mut model = train(&c45, &documents);
            black_box(c45.classifier(&mut model).unwrap())
        })
    });

    let selected = TfIdfClassifierFactory::new().with_feature_selector(TfIdfFeatureSelector::new(8));
    group.bench_function("tfidf_with_selection", |b| {
        b.iter(|| {
            let mut model = train(&selected, &documents);
            black_box(selected.classifier(&mut model).unwrap())
        })
    });

    group.finish();
}

/// Benchmark classification of unseen documents.
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let documents = tables(&generate_test_documents(400));
    let queries = tables(&generate_test_documents(100));
    group.throughput(Throughput::Elements(queries.len() as u64));

    let classifiers: Vec<(&str, Box<dyn Classifier<FrequencyTable<String>>>)> = vec![
        ("bayesian", {
            let factory = BayesianClassifierFactory::new();
            factory.classifier(&mut train(&factory, &documents)).unwrap()
        }),
        ("tfidf", {
            let factory = TfIdfClassifierFactory::new();
            factory.classifier(&mut train(&factory, &documents)).unwrap()
        }),
        ("knn_k5", {
            let factory = KNearestClassifierFactory::new().with_k(5);
            factory.classifier(&mut train(&factory, &documents)).unwrap()
        }),
        ("c45", {
            let factory = C45ClassifierFactory::new();
            factory.classifier(&mut train(&factory, &documents)).unwrap()
        }),
    ];

    for (name, classifier) in &classifiers {
        group.bench_function(*name, |b| {
            b.iter(|| {
                for (document, _) in &queries {
                    black_box(classifier.classify(black_box(document)));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_preprocessing, bench_fit, bench_classify);
criterion_main!(benches);

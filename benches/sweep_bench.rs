use cookiewarden::consent::{
    CategoryDecl, ConsentConfig, CookieSweeper, ManifestClassifier, PreferenceRecord,
};
use cookiewarden::cookies::access::CookieAccess;
use cookiewarden::cookies::document::{CookieDocument, JarDocument};
use cookiewarden::cookies::monster::CookieMonster;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;
use url::Url;

fn manifest() -> ConsentConfig {
    let mut config = ConsentConfig::new()
        .preference_cookie_name("prefs")
        .category(CategoryDecl::new("essential", ["session"]).optional(false));
    for i in 0..20 {
        config = config.category(CategoryDecl::new(format!("cat{i}"), [format!("c{i}_")]));
    }
    config
}

fn benchmark_classify(c: &mut Criterion) {
    let classifier = ManifestClassifier::new(&manifest());

    c.bench_function("classify_last_category", |b| {
        b.iter(|| black_box(classifier.classify(black_box("c19_tracker")).is_optional()))
    });
}

fn benchmark_cookie_get(c: &mut Criterion) {
    let store = CookieMonster::new();
    let url = Url::parse("https://www.example.com/foo/bar").unwrap();
    for i in 0..100 {
        store.parse_and_save_cookie(&url, &format!("cookie{}=val; Path=/foo", i));
    }

    c.bench_function("cookie_get_for_url", |b| {
        b.iter(|| {
            black_box(store.get_cookies_for_url(black_box(&url)));
        })
    });
}

fn benchmark_sweep(c: &mut Criterion) {
    let config = manifest();
    let classifier = Arc::new(ManifestClassifier::new(&config));
    let url = Url::parse("https://www.example.com/").unwrap();
    // Half the categories granted.
    let record: PreferenceRecord = (0..20).map(|i| (format!("cat{i}"), i % 2 == 0)).collect();

    c.bench_function("sweep_100_cookies", |b| {
        b.iter_batched(
            || {
                let doc = JarDocument::for_url(url.clone());
                for i in 0..100 {
                    doc.write_cookie(&format!("c{}_{}=v", i % 25, i));
                }
                CookieSweeper::new(
                    classifier.clone(),
                    CookieAccess::new(Arc::new(doc)),
                    true,
                )
            },
            |sweeper| black_box(sweeper.process_cookies(&record)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, benchmark_classify, benchmark_cookie_get, benchmark_sweep);
criterion_main!(benches);

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use hider::{Ledger, Page, resolve_for_hide};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 5_000;

fn make_page(blocks: usize) -> String {
    let mut out = String::with_capacity(blocks * 96 + 64);
    out.push_str("<style>.ad { display: flex } .box > span { display: block }</style><body>");
    for i in 0..blocks {
        if i % 10 == 0 {
            out.push_str(&format!("<div id=\"ad-{i}\" class=\"ad\"><span>sponsored {i}</span></div>"));
        } else {
            out.push_str("<div class=box><span>hello</span><img src=x></div><div>plain</div>");
        }
    }
    out.push_str("<footer>end</footer></body>");
    out
}

fn bench_resolve_small(c: &mut Criterion) {
    let page = Page::load("https://bench.test/", &make_page(SMALL_BLOCKS));
    c.bench_function("bench_resolve_small", |b| {
        b.iter(|| {
            let found = resolve_for_hide(page.doc(), black_box("#ad-0, .ad, div, .box > span"));
            black_box(found.len());
        });
    });
}

fn bench_resolve_large(c: &mut Criterion) {
    let page = Page::load("https://bench.test/", &make_page(LARGE_BLOCKS));
    c.bench_function("bench_resolve_large", |b| {
        b.iter(|| {
            let found = resolve_for_hide(page.doc(), black_box("#ad-4990, .ad, div, .box > span"));
            black_box(found.len());
        });
    });
}

fn bench_hide_reset_large(c: &mut Criterion) {
    let source = make_page(LARGE_BLOCKS);
    c.bench_function("bench_hide_reset_large", |b| {
        b.iter_batched(
            || Page::load("https://bench.test/", &source),
            |mut page| {
                let mut ledger = Ledger::new();
                for resolved in resolve_for_hide(page.doc(), ".ad, footer") {
                    let _ = ledger.hide(&mut page, &resolved.elements, resolved.bare);
                }
                black_box(ledger.reset_all(&mut page).ok());
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_resolve_small,
    bench_resolve_large,
    bench_hide_reset_large
);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eda::markdown::{render_markdown, repair_markdown, MessageRenderConfig};
use eda::ui::theme::Theme;

/// An answer with the split markers streaming produces, plus a fence and a table.
fn make_answer(items: usize) -> String {
    let mut out = String::from("## Summary\n\nThe document covers:\n\n");
    for i in 1..=items {
        out.push_str(&format!("{i}.\n\n**Point {i}** explains one idea in a sentence.\n"));
        out.push_str("Another line that belongs to the same item.\n");
    }
    out.push_str("\n```python\nfor i in range(3):\n    print(i)\n-\n```\n\n");
    out.push_str("| Term | Meaning |\n|------|---------|\n| ATP | energy |\n");
    out
}

fn bench_repair_and_render(c: &mut Criterion) {
    let theme = Theme::dark_default();
    let mut group = c.benchmark_group("markdown");

    for &items in &[10usize, 200usize] {
        let answer = make_answer(items);
        group.throughput(Throughput::Bytes(answer.len() as u64));

        group.bench_with_input(BenchmarkId::new("repair", items), &answer, |b, input| {
            b.iter(|| repair_markdown(input))
        });

        group.bench_with_input(
            BenchmarkId::new("render_with_repair", items),
            &answer,
            |b, input| {
                b.iter(|| {
                    render_markdown(
                        input,
                        &theme,
                        MessageRenderConfig::markdown(true, false).with_terminal_width(Some(100)),
                    )
                })
            },
        );

        group.bench_with_input(BenchmarkId::new("render_highlighted", items), &answer, |b, input| {
            b.iter(|| {
                render_markdown(
                    input,
                    &theme,
                    MessageRenderConfig::markdown(true, true).with_terminal_width(Some(100)),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_repair_and_render);
criterion_main!(benches);

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use orgchart::render::{DiffRenderer, ExportMode, Exporter, LayoutConfig, Orientation, compute_layout};
use orgchart::{ChartSettings, CollapseLevel, Employee, OrgTree};

/// `fanout` reports per manager, `depth` levels below the root.
fn synthetic(fanout: usize, depth: usize) -> Employee {
    fn grow(id: &mut usize, fanout: usize, depth: usize) -> Employee {
        *id += 1;
        let mut e = Employee::new(id.to_string(), format!("Employee {id}"), "Engineer");
        if depth > 0 {
            e.children = (0..fanout).map(|_| grow(id, fanout, depth - 1)).collect();
        }
        e
    }
    let mut id = 0;
    grow(&mut id, fanout, depth)
}

fn fixtures() -> Vec<(&'static str, Employee)> {
    vec![
        ("wide_2x200", synthetic(200, 1)),
        ("deep_2x10", synthetic(2, 10)),
        ("bushy_6x4", synthetic(6, 4)),
    ]
}

fn bench_layout(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("layout_full_tree");
    for (name, root) in fixtures() {
        let tree = OrgTree::build(root);
        group.bench_function(name, |b| {
            b.iter(|| compute_layout(&tree, Orientation::Vertical, &config));
        });
    }
    group.finish();
}

fn bench_toggle_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("toggle_root_diff");
    for (name, root) in fixtures() {
        let mut tree = OrgTree::build(root);
        tree.apply_initial_collapse(CollapseLevel::Level(3));
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let mut tree = tree.clone();
                    let mut renderer = DiffRenderer::default();
                    let root = tree.root();
                    renderer.update(&mut tree, root, Orientation::Vertical);
                    (tree, renderer)
                },
                |(mut tree, mut renderer)| {
                    let root = tree.root();
                    tree.toggle(root);
                    renderer.update(&mut tree, root, Orientation::Vertical)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_full_export(c: &mut Criterion) {
    let settings = ChartSettings::default();
    let exporter = Exporter::default();
    let mut group = c.benchmark_group("export_full_expand_svg");
    for (name, root) in fixtures() {
        let mut tree = OrgTree::build(root);
        tree.apply_initial_collapse(CollapseLevel::Level(2));
        group.bench_function(name, |b| {
            b.iter(|| {
                let scene = exporter
                    .scene(
                        &mut tree,
                        None,
                        Orientation::Vertical,
                        ExportMode::FullExpand,
                        &settings,
                    )
                    .unwrap();
                exporter.export_svg(&scene)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout, bench_toggle_diff, bench_full_export);
criterion_main!(benches);

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use diagram_bench::util::layered_document;
use diagram_storage::{DiagramStore, MemoryStore};
use diagram_sync::{NullView, SyncController, SyncSettings};

fn bench_import_500_nodes(c: &mut Criterion) {
    let doc = layered_document(20, 25);
    let mut controller = SyncController::new(
        DiagramStore::new(MemoryStore::new()),
        NullView,
        SyncSettings::default(),
    );

    c.bench_function("import_500_nodes", |b| {
        b.iter(|| {
            controller
                .import_graph(black_box(&doc))
                .expect("valid document");
        })
    });
}

fn bench_import_then_add_node(c: &mut Criterion) {
    let doc = layered_document(10, 20);
    let mut controller = SyncController::new(
        DiagramStore::new(MemoryStore::new()),
        NullView,
        SyncSettings::default(),
    );

    c.bench_function("import_then_add_node_200_nodes", |b| {
        b.iter(|| {
            controller.import_graph(&doc).expect("valid document");
            let id = controller.add_node("Bench", "", None).expect("fresh id");
            black_box(id);
        })
    });
}

criterion_group!(benches, bench_import_500_nodes, bench_import_then_add_node);
criterion_main!(benches);

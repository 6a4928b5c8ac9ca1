//! Reachability graph and n-gram index benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use process_state::core::marking::marking_of;
use process_state::{NGramIndex, PetriNet, ReachabilityGraphOptions};

/// Petri net with `branches` parallel branches, each a choice between two tasks
fn parallel_choices(branches: usize) -> PetriNet {
    let mut net = PetriNet::new();
    net.add_place(Some("start"), "start").unwrap();
    net.add_place(Some("joined"), "joined").unwrap();
    net.add_place(Some("end"), "end").unwrap();
    net.add_transition(Some("split"), "", true).unwrap();
    net.add_transition(Some("join"), "", true).unwrap();
    net.add_transition(Some("Z"), "Z", false).unwrap();
    net.add_edge("start", "split").unwrap();
    net.add_edge("join", "joined").unwrap();
    net.add_edge("joined", "Z").unwrap();
    net.add_edge("Z", "end").unwrap();
    for branch in 0..branches {
        let open = format!("open_{branch}");
        let done = format!("done_{branch}");
        net.add_place(Some(&open), &open).unwrap();
        net.add_place(Some(&done), &done).unwrap();
        net.add_edge("split", &open).unwrap();
        net.add_edge(&done, "join").unwrap();
        for choice in ["A", "B"] {
            let task = format!("{choice}{branch}");
            net.add_transition(Some(&task), &task, false).unwrap();
            net.add_edge(&open, &task).unwrap();
            net.add_edge(&task, &done).unwrap();
        }
    }
    net.set_initial_marking(marking_of(["start"])).unwrap();
    net.add_final_marking(marking_of(["end"])).unwrap();
    net
}

fn bench_reachability_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reachability Graph");
    for branches in [2, 3, 4] {
        let net = parallel_choices(branches);
        for (name, options) in [
            ("cached", ReachabilityGraphOptions::default()),
            ("uncached", ReachabilityGraphOptions::uncached()),
        ] {
            group.bench_with_input(BenchmarkId::new(name, branches), &net, |b, net| {
                b.iter(|| black_box(net.get_reachability_graph(black_box(&options)).unwrap()))
            });
        }
    }
    group.finish();
}

fn bench_n_gram_index(c: &mut Criterion) {
    let graph = parallel_choices(4)
        .get_reachability_graph(&ReachabilityGraphOptions::default())
        .unwrap();
    let mut group = c.benchmark_group("N-Gram Index");
    for limit in [1, 3, 5] {
        group.bench_with_input(BenchmarkId::new("build", limit), &limit, |b, limit| {
            b.iter(|| black_box(NGramIndex::new(&graph, *limit).build()))
        });
    }
    let index = NGramIndex::new(&graph, 3).build();
    let histories: Vec<Vec<String>> = (0..1000)
        .map(|i| {
            (0..4)
                .map(|branch| format!("{}{}", if (i >> branch) & 1 == 0 { "A" } else { "B" }, (i + branch) % 4))
                .collect()
        })
        .collect();
    group.bench_function("lookup_batch_1000", |b| {
        b.iter(|| black_box(index.get_best_marking_states_for_all(black_box(&histories))))
    });
    group.finish();
}

criterion_group!(benches, bench_reachability_graph, bench_n_gram_index);
criterion_main!(benches);

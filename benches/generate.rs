use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use optgen::schema::{Field, File, Kind, Message, Package, SchemaSet, TypeRef};
use optgen::Config;
use rand::{prelude::StdRng, seq::SliceRandom, Rng, SeedableRng};

const FIELD_NAMES: &[&str] = &[
    "id", "name", "created_at", "updated_at", "owner", "labels", "status", "count", "payload",
    "parent", "children", "version", "kind", "description", "enabled", "weight",
];

/// A schema set of `files * messages` messages drawing field names from a small
/// pool, so that roughly half of them collide.
fn schema(files: usize, messages: usize) -> SchemaSet {
    let mut rng = StdRng::seed_from_u64(0);
    let mut out = Vec::with_capacity(files);
    for f in 0..files {
        let package = Package::new(format!("bench.p{}", f));
        let mut file = File::new(format!("bench/p{}.proto", f), package.clone());
        for m in 0..messages {
            let ty = TypeRef::new(package.clone(), format!("Message{}", m));
            let mut message = Message::new(ty);
            let mut names = FIELD_NAMES.to_vec();
            names.shuffle(&mut rng);
            for (i, name) in names.iter().take(rng.gen_range(2..10)).enumerate() {
                let field = match i % 5 {
                    0 => Field::new(*name, Kind::String),
                    1 => Field::new(*name, Kind::Int64).repeated(),
                    2 => Field::map(*name, Kind::String, Kind::Uint32),
                    3 => Field::new(
                        *name,
                        Kind::Message(TypeRef::new(
                            package.clone(),
                            format!("Message{}", (m + 1) % messages),
                        )),
                    ),
                    _ => Field::new(*name, Kind::Bool).nullable(),
                };
                message = message.field(field);
            }
            if m % 3 == 0 {
                message = message.oneof(
                    "choice",
                    vec![
                        Field::new(format!("text{}", m), Kind::String),
                        Field::new(format!("number{}", m), Kind::Int32),
                    ],
                );
            }
            file = file.message(message);
        }
        out.push(file);
    }
    SchemaSet::new(out)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for (files, messages) in [(1, 10), (4, 50), (16, 100)] {
        let set = schema(files, messages);
        let config = Config::new();
        group
            .throughput(Throughput::Elements((files * messages) as u64))
            .bench_with_input(
                BenchmarkId::from_parameter(format!("{}x{}", files, messages)),
                &set,
                |b, set| b.iter(|| optgen::generate(set, &config)),
            );
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

use carga_clientes::extract::fixed_width::format_line;
use carga_clientes::prelude::*;
use carga_clientes::transform::record::build_record;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Write;
use tempfile::NamedTempFile;

fn sample_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let document = if i % 2 == 0 { "529.982.247-25" } else { "11.222.333/0001-81" };
            let ticket = format!("{},{}", 100 + i, i % 100);
            format_line([
                document,
                "1",
                "0",
                "2023-05-17",
                &ticket,
                "NULL",
                "Loja São João",
                "Açaí Paraná",
            ])
        })
        .collect()
}

fn benchmark_parse_and_transform(c: &mut Criterion) {
    let lines = sample_lines(1000);

    c.bench_function("parse_transform_1000_lines", |b| {
        b.iter(|| {
            for (i, line) in lines.iter().enumerate() {
                let raw = parse_line(line.as_bytes(), i + 2).unwrap();
                black_box(build_record(raw));
            }
        })
    });
}

fn benchmark_document_validation(c: &mut Criterion) {
    c.bench_function("validate_cpf", |b| {
        b.iter(|| is_valid_document(black_box("529.982.247-25")))
    });

    c.bench_function("validate_cnpj", |b| {
        b.iter(|| is_valid_document(black_box("11.222.333/0001-81")))
    });

    c.bench_function("normalize_store_name", |b| {
        b.iter(|| normalize(black_box("Padaria Pão de Açúcar - Jardim Paulistânia")))
    });
}

fn benchmark_pipeline_end_to_end(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut input = NamedTempFile::new().unwrap();
    writeln!(input, "CPF PRIVATE INCOMPLETO").unwrap();
    for line in sample_lines(1000) {
        writeln!(input, "{}", line).unwrap();
    }

    c.bench_function("pipeline_file_to_memory_1000_lines", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let loader = MemoryLoader::new();

                let result = Pipeline::builder()
                    .extract(FileExtractor::new(input.path()))
                    .load(loader.clone())
                    .event_emitter(InMemoryEventEmitter::new())
                    .build()
                    .execute()
                    .await
                    .unwrap();

                black_box(result);
            });
        })
    });
}

criterion_group!(
    benches,
    benchmark_parse_and_transform,
    benchmark_document_validation,
    benchmark_pipeline_end_to_end
);

criterion_main!(benches);

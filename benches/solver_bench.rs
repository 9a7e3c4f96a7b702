//! Solver microbenchmarks (subtype, join, inference, union normalization).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pytc_common::Options;
use pytc_solver::{
    infer_function_arguments, is_subtype, join_types, map_actuals_to_formals, CallableData, Ctx, Kind, TypeId, TypeInfoArena,
    TypeInterner,
};

fn bench_subtype(c: &mut Criterion) {
    let mut interner = TypeInterner::new();
    let type_infos = TypeInfoArena::new();
    let options = Options::default();
    let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
    let members: Vec<_> = (0..32).map(|i| interner.literal_int(i, TypeId::OBJECT_FALLBACK)).collect();
    let union = interner.union(members);

    c.bench_function("subtype_literal_in_large_union", |b| {
        b.iter(|| {
            let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
            black_box(is_subtype(&mut ctx, a, union))
        })
    });
}

fn bench_join(c: &mut Criterion) {
    let mut interner = TypeInterner::new();
    let type_infos = TypeInfoArena::new();
    let options = Options::default();
    let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
    let b = interner.literal_int(2, TypeId::OBJECT_FALLBACK);

    c.bench_function("join_two_literals", |bencher| {
        bencher.iter(|| {
            let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
            black_box(join_types(&mut ctx, a, b))
        })
    });
}

fn bench_union_normalization(c: &mut Criterion) {
    let mut interner = TypeInterner::new();
    let members: Vec<TypeId> = (0..64).map(|i| interner.literal_int(i, TypeId::OBJECT_FALLBACK)).collect();

    c.bench_function("union_normalize_64_literals", |b| {
        b.iter(|| {
            let members = members.clone();
            black_box(interner.union(members))
        })
    });
}

fn bench_infer_function_arguments(c: &mut Criterion) {
    let mut interner = TypeInterner::new();
    let type_infos = TypeInfoArena::new();
    let options = Options::default();

    let callee = CallableData {
        arg_types: vec![TypeId::OBJECT_FALLBACK],
        arg_kinds: vec![Kind::Pos],
        arg_names: vec![None],
        ret_type: TypeId::OBJECT_FALLBACK,
        fallback: TypeId::OBJECT_FALLBACK,
        variables: vec![],
        is_ellipsis_args: false,
        special_sig: None,
        bound_args: vec![None],
        type_guard: None,
    };
    let actual_types = vec![TypeId::OBJECT_FALLBACK];
    let actual_kinds = vec![Kind::Pos];
    let actual_names: Vec<Option<pytc_common::Atom>> = vec![None];
    let formal_to_actual = map_actuals_to_formals(&interner, &actual_kinds, &actual_names, &actual_types, &callee).unwrap();

    c.bench_function("infer_function_arguments_single_arg", |b| {
        b.iter(|| {
            let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
            let mut diagnostics = Vec::new();
            black_box(infer_function_arguments(&mut ctx, &callee, &actual_types, &formal_to_actual, None, &mut diagnostics))
        })
    });
}

criterion_group!(solver_benches, bench_subtype, bench_join, bench_union_normalization, bench_infer_function_arguments);
criterion_main!(solver_benches);

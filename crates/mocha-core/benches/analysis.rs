//! Benchmark suite for the Mocha semantic analyzer
//!
//! Measures full analysis over synthetic programs: a chain of classes
//! where each subclass overrides a method of its base and every method
//! body exercises arithmetic, calls, and control flow.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use mocha_core::ast::{ArithOp, Ast, Ident, NodeId, PrimType, RelOp};
use mocha_core::location::Location;
use mocha_core::Analyzer;

fn loc(line: u32) -> Location {
    Location::span(line, 1, 40)
}

fn ident(name: &str, line: u32) -> Ident {
    Ident::new(name, loc(line))
}

/// `int work(int seed) { while (seed < 100) seed = seed + 1; return seed; }`
fn work_method(ast: &mut Ast, line: u32) -> NodeId {
    let seed_ty = ast.prim_type(PrimType::Int, loc(line));
    let seed = ast.var_decl(ident("seed", line), seed_ty);

    let seed_use = ast.field_access(None, ident("seed", line));
    let limit = ast.int_lit(100, loc(line));
    let cmp = ast.relational(seed_use, RelOp::Lt, limit);
    let target = ast.field_access(None, ident("seed", line));
    let base = ast.field_access(None, ident("seed", line));
    let one = ast.int_lit(1, loc(line));
    let bump = ast.arithmetic(Some(base), ArithOp::Add, one);
    let step = ast.assign(target, bump);
    let lop = ast.while_stmt(cmp, step, loc(line));

    let result = ast.field_access(None, ident("seed", line));
    let ret = ast.return_stmt(result, loc(line));

    let body = ast.block(Vec::new(), vec![lop, ret], loc(line));
    let ret_ty = ast.prim_type(PrimType::Int, loc(line));
    ast.fn_decl(ident("work", line), ret_ty, vec![seed], Some(body))
}

/// A chain of `num_classes` classes, each extending the previous one and
/// overriding `work` with an identical signature
fn class_chain(num_classes: u32) -> Ast {
    let mut ast = Ast::new();
    let mut decls = Vec::new();
    for i in 0..num_classes {
        let line = i + 1;
        let name = format!("C{i}");
        let method = work_method(&mut ast, line);
        let extends = if i == 0 {
            None
        } else {
            Some(ast.named_type(ident(&format!("C{}", i - 1), line)))
        };
        decls.push(ast.class_decl(ident(&name, line), extends, Vec::new(), vec![method]));
    }

    // void main() { C<last> c; c = new C<last>; c.work(7); }
    let last = format!("C{}", num_classes - 1);
    let line = num_classes + 1;
    let c_ty = ast.named_type(ident(&last, line));
    let c = ast.var_decl(ident("c", line), c_ty);
    let c_use = ast.field_access(None, ident("c", line));
    let new_ty = ast.named_type(ident(&last, line));
    let new_c = ast.new_expr(new_ty, loc(line));
    let store = ast.assign(c_use, new_c);
    let c_use2 = ast.field_access(None, ident("c", line));
    let seven = ast.int_lit(7, loc(line));
    let call = ast.call(Some(c_use2), ident("work", line), vec![seven], loc(line));
    let body = ast.block(vec![c], vec![store, call], loc(line));
    let ret = ast.prim_type(PrimType::Void, loc(line));
    let main = ast.fn_decl(ident("main", line), ret, Vec::new(), Some(body));
    decls.push(main);

    ast.build_program(decls, loc(1));
    ast
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    for num_classes in [10u32, 100, 500] {
        group.bench_with_input(
            BenchmarkId::new("class_chain", num_classes),
            &num_classes,
            |b, &num_classes| {
                // analysis mutates per-node state, so every iteration
                // gets a fresh tree
                b.iter_batched(
                    || class_chain(num_classes),
                    |ast| {
                        let result = Analyzer::new(&ast).analyze();
                        assert!(result.success);
                        black_box(result)
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_analysis);
criterion_main!(benches);

use iai::black_box;
use luaslim::{LuaMinifier, MinifyConfig, Transform};

fn minify_sieve() {
    let sieve_lua = include_str!("sieve.lua");
    black_box(LuaMinifier.transform(black_box(sieve_lua), &MinifyConfig::default()).unwrap());
}

fn minify_sieve_folding() {
    let sieve_lua = include_str!("sieve.lua");
    let cfg = MinifyConfig { rename_globals: true, fold_constants: true, ..Default::default() };
    black_box(LuaMinifier.transform(black_box(sieve_lua), &cfg).unwrap());
}

iai::main!(minify_sieve, minify_sieve_folding);

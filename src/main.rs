#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
use jemallocator::Jemalloc;
#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use luaslim::logging::setup_logging;
use luaslim::stylize::Stylize;
use luaslim::{LuaMinifier, Runner};
use std::env::args;
use std::path::Path;
use std::process::exit;

fn usage() -> ! {
    eprintln!("Usage: luaslim <source.lua> <destination.lua>");
    exit(1);
}

fn main() {
    setup_logging();
    let mut argv = args().skip(1);
    let Some(src) = argv.next() else { usage() };
    let Some(dst) = argv.next() else { usage() };
    let extra: Vec<String> = argv.collect();
    if !extra.is_empty() {
        log::warn!("ignoring extra arguments: {:?}", extra);
    }
    match Runner::new(LuaMinifier).run(Path::new(&src), Path::new(&dst)) {
        Ok(_) => println!("Ok!"),
        Err(e) => {
            eprintln!("{} {}", "error:".style_error(), e);
            exit(e.exit_code());
        }
    }
}

use luaslim::stylize::Stylize;
use luaslim::tokit::{tokenize, LUA_OPERATORS};
use std::env;
use std::fs;
use std::io::{self, prelude::*};
use std::process::exit;

fn usage() -> ! {
    eprintln!("Usage: tokenize <file.lua>");
    eprintln!("       tokenize --dot");
    exit(1);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &args[..] {
        [flag] if flag == "--dot" => LUA_OPERATORS.print_dot(&mut out)?,
        [file] => {
            let code = fs::read_to_string(file)?;
            let lexed = tokenize(&code)?;
            if let Some(shebang) = lexed.shebang {
                writeln!(out, "shebang {shebang:?}")?;
            }
            for tok in lexed.toks.iter() {
                let pos = format!("{}:{}", tok.line, tok.col);
                let kind = format!("{:?}", tok.kind);
                writeln!(out, "{:>8} {:<8} {}", pos.style_pos(), kind.style_kind(), tok)?;
            }
            for comment in lexed.trailer.iter() {
                writeln!(out, "trailer {comment:?}")?;
            }
        }
        _ => usage(),
    }
    Ok(())
}

//! Short Name Assignment

use ahash::{AHashMap, AHashSet};

use crate::config::MinifyConfig;
use crate::scope::{Binding, LocalId, Resolution, ScopeEvent};
use crate::tok::{is_keyword, Token};

const FIRST: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
const REST: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_0123456789";

/// The `n`th identifier of the sequence `a b .. Z _ aa ba ..`.
pub fn nth_name(mut n: usize) -> String {
    let mut name = String::new();
    name.push(FIRST[n % FIRST.len()] as char);
    n /= FIRST.len();
    while n > 0 {
        n -= 1;
        name.push(REST[n % REST.len()] as char);
        n /= REST.len();
    }
    name
}

fn usable(name: &str, reserved: &AHashSet<String>) -> bool {
    !is_keyword(name) && name != "goto" && !reserved.contains(name)
}

/// First generated name that is neither reserved nor taken.
fn pick(reserved: &AHashSet<String>, live: &AHashMap<String, usize>) -> String {
    let mut i = 0;
    loop {
        let name = nth_name(i);
        if usable(&name, reserved) && !live.contains_key(&name) {
            return name;
        }
        i += 1;
    }
}

/**
 * Choose new names and return the replacement text of every name token that
 * changes, keyed by token index.
 *
 * Locals are named by replaying the scope events: a local takes the first
 * free name not held by a local that is still in scope, so sibling scopes
 * reuse the same short names. Globals that are left alone are reserved
 * everywhere.
 */
pub fn assign_names(res: &Resolution, toks: &[Token], config: &MinifyConfig) -> AHashMap<usize, String> {
    // A global read before its first assignment may be set by the host
    let renames_global = |g: &str| {
        config.rename_globals
            && res.assigned_globals.contains(g)
            && !res.read_before_assign.contains(g)
    };

    let mut reserved: AHashSet<String> = res.globals
                                            .iter()
                                            .filter(|g| !renames_global(g))
                                            .map(|g| g.to_string())
                                            .collect();
    reserved.extend(res.locals
                       .iter()
                       .filter(|l| l.pinned || !config.rename_locals)
                       .map(|l| l.name.to_string()));

    let mut global_names: AHashMap<&str, String> = AHashMap::new();
    let mut next = 0;
    for g in res.globals.iter().filter(|g| renames_global(g)) {
        while !usable(&nth_name(next), &reserved) {
            next += 1;
        }
        let name = nth_name(next);
        reserved.insert(name.clone());
        global_names.insert(g, name);
    }

    let mut local_names: Vec<Option<String>> = vec![None; res.locals.len()];
    if config.rename_locals {
        let mut frames: Vec<Vec<LocalId>> = Vec::new();
        let mut live: AHashMap<String, usize> = AHashMap::new();
        for ev in res.events.iter() {
            match *ev {
                ScopeEvent::Open => frames.push(Vec::new()),
                ScopeEvent::Declare(id) => {
                    let local = &res.locals[id];
                    let name = if local.pinned {
                        local.name.to_string()
                    } else {
                        pick(&reserved, &live)
                    };
                    *live.entry(name.clone()).or_default() += 1;
                    if let Some(frame) = frames.last_mut() {
                        frame.push(id);
                    }
                    local_names[id] = Some(name);
                }
                ScopeEvent::Close => {
                    for id in frames.pop().unwrap_or_default() {
                        let Some(name) = &local_names[id] else { continue };
                        if let Some(cnt) = live.get_mut(name) {
                            *cnt -= 1;
                            if *cnt == 0 {
                                live.remove(name);
                            }
                        }
                    }
                }
            }
        }
    }

    let mut out = AHashMap::new();
    for &(idx, binding) in res.refs.iter() {
        let old = toks[idx].text;
        let new = match binding {
            Binding::Local(id) => local_names[id].as_deref(),
            Binding::Global => global_names.get(old).map(String::as_str),
        };
        if let Some(new) = new.filter(|new| *new != old) {
            out.insert(idx, new.to_string());
        }
    }
    log::debug!("{} locals, {} globals renamed, {} name tokens rewritten",
                local_names.iter().flatten().count(), global_names.len(), out.len());
    out
}

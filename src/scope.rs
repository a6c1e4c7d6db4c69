//! Lexical Scope Resolution

use ahash::AHashSet;

pub type LocalId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Local(LocalId),
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local<'a> {
    pub name: &'a str,
    /// Pinned locals keep their name, e.g the implicit `self` of a method.
    pub pinned: bool,
}

/// Scope changes in source order, replayed when choosing new names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEvent {
    Open,
    Declare(LocalId),
    Close,
}

/// Where every name in a chunk points.
#[derive(Debug, Default)]
pub struct Resolution<'a> {
    pub locals: Vec<Local<'a>>,
    pub events: Vec<ScopeEvent>,
    /// Token index of each variable name, with what it refers to.
    pub refs: Vec<(usize, Binding)>,
    /// Global names in order of first appearance.
    pub globals: Vec<&'a str>,
    /// Globals that the chunk assigns to somewhere.
    pub assigned_globals: AHashSet<&'a str>,
    /// Globals read before the chunk first assigns them, so their value
    /// comes from the host environment.
    pub read_before_assign: AHashSet<&'a str>,
    seen_globals: AHashSet<&'a str>,
}

impl<'a> Resolution<'a> {
    #[cfg(test)]
    pub fn binding_of(&self, tok_idx: usize) -> Option<Binding> {
        self.refs.iter()
                 .find(|(idx, _)| *idx == tok_idx)
                 .map(|(_, b)| *b)
    }
}

#[derive(Debug, Default)]
pub struct Scopes<'a> {
    stack: Vec<Vec<(&'a str, LocalId)>>,
    res: Resolution<'a>,
}

impl<'a> Scopes<'a> {
    pub fn new() -> Scopes<'a> {
        Scopes::default()
    }

    pub fn open(&mut self) {
        self.stack.push(Vec::new());
        self.res.events.push(ScopeEvent::Open);
    }

    pub fn close(&mut self) {
        self.stack.pop();
        self.res.events.push(ScopeEvent::Close);
    }

    /// Bring a local into scope, `tok` is the index of its name token when
    /// it has one.
    pub fn declare(&mut self, name: &'a str, tok: Option<usize>, pinned: bool) -> LocalId {
        let id = self.res.locals.len();
        self.res.locals.push(Local { name, pinned: pinned || name == "_ENV" });
        self.res.events.push(ScopeEvent::Declare(id));
        if let Some(frame) = self.stack.last_mut() {
            frame.push((name, id));
        }
        if let Some(tok) = tok {
            self.res.refs.push((tok, Binding::Local(id)));
        }
        id
    }

    pub fn lookup(&self, name: &str) -> Binding {
        self.stack.iter()
                  .rev()
                  .flat_map(|frame| frame.iter().rev())
                  .find(|(n, _)| *n == name)
                  .map(|(_, id)| Binding::Local(*id))
                  .unwrap_or(Binding::Global)
    }

    /// Resolve a variable name read or written at token `tok`.
    pub fn reference(&mut self, name: &'a str, tok: usize) -> Binding {
        let binding = self.lookup(name);
        if binding == Binding::Global && self.res.seen_globals.insert(name) {
            self.res.globals.push(name);
        }
        self.res.refs.push((tok, binding));
        binding
    }

    /// Record that a resolved variable is read.
    pub fn read(&mut self, name: &'a str, binding: Binding) {
        if binding == Binding::Global && !self.res.assigned_globals.contains(name) {
            self.res.read_before_assign.insert(name);
        }
    }

    /// Record that a resolved variable is assigned to.
    pub fn assign(&mut self, name: &'a str, binding: Binding) {
        if binding == Binding::Global {
            self.res.assigned_globals.insert(name);
        }
    }

    pub fn finish(self) -> Resolution<'a> {
        self.res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_and_globals() {
        let mut scopes = Scopes::new();
        scopes.open();
        let x = scopes.declare("x", Some(1), false);
        assert_eq!(scopes.reference("x", 3), Binding::Local(x));
        scopes.open();
        let inner = scopes.declare("x", Some(5), false);
        assert_eq!(scopes.lookup("x"), Binding::Local(inner));
        scopes.close();
        assert_eq!(scopes.lookup("x"), Binding::Local(x));
        let print = scopes.reference("print", 7);
        assert_eq!(print, Binding::Global);
        scopes.reference("print", 9);
        scopes.assign("y", scopes.lookup("y"));
        scopes.close();
        let res = scopes.finish();
        assert_eq!(res.globals, ["print"]);
        assert!(res.assigned_globals.contains("y"));
        assert_eq!(res.binding_of(5), Some(Binding::Local(inner)));
        assert_eq!(res.events, [ScopeEvent::Open, ScopeEvent::Declare(x),
                                ScopeEvent::Open, ScopeEvent::Declare(inner),
                                ScopeEvent::Close, ScopeEvent::Close]);
    }

    #[test]
    fn read_before_first_assignment() {
        let mut scopes = Scopes::new();
        scopes.open();
        let print = scopes.reference("print", 0);
        scopes.read("print", print);
        scopes.assign("print", print);
        let count = scopes.reference("count", 4);
        scopes.assign("count", count);
        scopes.read("count", count);
        let x = scopes.declare("x", Some(8), false);
        scopes.read("x", Binding::Local(x));
        scopes.close();
        let res = scopes.finish();
        assert!(res.read_before_assign.contains("print"));
        assert!(!res.read_before_assign.contains("count"));
        assert!(!res.read_before_assign.contains("x"));
        assert!(res.assigned_globals.contains("count"));
    }

    #[test]
    fn env_is_pinned() {
        let mut scopes = Scopes::new();
        scopes.open();
        scopes.declare("_ENV", Some(1), false);
        scopes.declare("self", None, true);
        scopes.declare("t", Some(3), false);
        let res = scopes.finish();
        let pinned: Vec<bool> = res.locals.iter().map(|l| l.pinned).collect();
        assert_eq!(pinned, [true, true, false]);
    }
}

/*!
Multi-namespace regex systems.

A system is a set of namespaces, each declaring regexes by local name and
importing other namespaces under aliases. [`ReSystem::process`] links the
whole set: it parses every declaration, qualifies `${Name}` references into
fully qualified `NS::Name` form, injects `${$ENV}` literals from an
environment lookup, rejects reference cycles, inlines referenced subtrees
in dependency order, and compiles an executor per surviving regex.

Errors are accumulated, not thrown; declarations untouched by a cycle or a
bad import still produce executors.
*/

use std::collections::HashMap;
use std::fmt;

use brex_unicode::ascii::find_non_printable_byte;
use itertools::Itertools;

use crate::ast::{Alphabet, Regex, RegexComponent, RegexOpt, ToplevelEntry};
use crate::regex::{CompileError, Executor, RegexCompiler};
use crate::syntax::{parse_unicode_regex, Diagnostic};

/// One namespace bundle: its name, imports and regex declarations.
///
/// ```
/// use brex::system::NamespaceInfo;
///
/// let ns = NamespaceInfo::new("Other")
///     .import("MM", "Main")
///     .regex("Foo", r#"/"abc"/"#);
/// assert_eq!(ns.name, "Other");
/// ```
#[derive(Clone, Debug, Default)]
pub struct NamespaceInfo {
    pub name: String,
    /// `(alias, namespace)` pairs.
    pub imports: Vec<(String, String)>,
    /// `(local name, source)` pairs.
    pub regexes: Vec<(String, String)>,
}

impl NamespaceInfo {
    pub fn new(name: impl Into<String>) -> Self {
        NamespaceInfo {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn import(mut self, alias: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.imports.push((alias.into(), namespace.into()));
        self
    }

    pub fn regex(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.regexes.push((name.into(), source.into()));
        self
    }
}

/// A linking problem, tagged with the fully qualified name it arose in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SystemError {
    Parse { fqn: String, diag: Diagnostic },
    UnknownAlias { fqn: String, alias: String },
    UnknownName { fqn: String, name: String },
    NotSimple { fqn: String, name: String },
    Env { fqn: String, name: String, reason: String },
    Cycle { names: Vec<String> },
    Compile { fqn: String, err: CompileError },
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::Parse { fqn, diag } => write!(f, "{fqn}: {diag}"),
            SystemError::UnknownAlias { fqn, alias } => {
                write!(f, "{fqn}: `{alias}` is not an imported namespace")
            }
            SystemError::UnknownName { fqn, name } => {
                write!(f, "{fqn}: reference to unknown regex `{name}`")
            }
            SystemError::NotSimple { fqn, name } => {
                write!(
                    f,
                    "{fqn}: referenced regex `{name}` has anchors or toplevel markers and cannot be inlined"
                )
            }
            SystemError::Env { fqn, name, reason } => {
                write!(f, "{fqn}: env reference `{name}` {reason}")
            }
            SystemError::Cycle { names } => {
                write!(
                    f,
                    "reference cycle between {}",
                    names.iter().map(|n| format!("`{n}`")).join(", ")
                )
            }
            SystemError::Compile { fqn, err } => write!(f, "{fqn}: {err}"),
        }
    }
}

impl std::error::Error for SystemError {}

/// A linked system: resolved regexes and their executors, by FQN.
#[derive(Default)]
pub struct ReSystem {
    regexes: HashMap<String, Regex>,
    executors: HashMap<String, Executor>,
}

impl ReSystem {
    /// Links a set of namespace bundles. `env` maps env names to raw byte
    /// values; a missing map behaves as an empty one.
    pub fn process(
        infos: Vec<NamespaceInfo>,
        env: Option<&HashMap<String, Vec<u8>>>,
    ) -> (ReSystem, Vec<SystemError>) {
        Linker::run(infos, env)
    }

    /// The resolved, standalone AST for a fully qualified name.
    pub fn regex(&self, fqn: &str) -> Option<&Regex> {
        self.regexes.get(fqn)
    }

    /// The compiled executor for a fully qualified name.
    pub fn executor(&self, fqn: &str) -> Option<&Executor> {
        self.executors.get(fqn)
    }

    /// Every fully qualified name that linked successfully, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.executors.keys().map(String::as_str).sorted().collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct Item {
    fqn: String,
    namespace: usize,
    regex: Option<Regex>,
    deps: Vec<String>,
    failed: bool,
}

struct Linker<'e> {
    infos: Vec<NamespaceInfo>,
    env: Option<&'e HashMap<String, Vec<u8>>>,
    items: Vec<Item>,
    index: HashMap<String, usize>,
    errors: Vec<SystemError>,
}

impl<'e> Linker<'e> {
    fn run(
        infos: Vec<NamespaceInfo>,
        env: Option<&'e HashMap<String, Vec<u8>>>,
    ) -> (ReSystem, Vec<SystemError>) {
        let mut linker = Linker {
            infos,
            env,
            items: Vec::new(),
            index: HashMap::new(),
            errors: Vec::new(),
        };
        linker.parse_pass();
        linker.qualify_pass();
        linker.env_pass();
        linker.cycle_pass();
        let sys = linker.inline_and_compile();
        (sys, linker.errors)
    }

    fn parse_pass(&mut self) {
        for (ni, info) in self.infos.iter().enumerate() {
            for (local, source) in &info.regexes {
                let fqn = format!("{}::{}", info.name, local);
                let (regex, diags) = parse_unicode_regex(source);
                let failed = !diags.is_empty() || regex.is_none();
                for diag in diags {
                    self.errors.push(SystemError::Parse {
                        fqn: fqn.clone(),
                        diag,
                    });
                }
                self.index.insert(fqn.clone(), self.items.len());
                self.items.push(Item {
                    fqn,
                    namespace: ni,
                    regex: regex.filter(|_| !failed),
                    deps: Vec::new(),
                    failed,
                });
            }
        }
    }

    /// Rewrites every `NamedRef` into `NS::Name` form through the enclosing
    /// namespace's imports, and records the dependency edges.
    fn qualify_pass(&mut self) {
        for i in 0..self.items.len() {
            let Some(regex) = self.items[i].regex.take() else {
                continue;
            };
            let info = &self.infos[self.items[i].namespace];
            let fqn = self.items[i].fqn.clone();

            let mut deps = Vec::new();
            let mut failed = false;
            let mut errors = Vec::new();
            let qualified = rewrite_regex(&regex, &mut |opt| {
                let RegexOpt::NamedRef { name } = opt else {
                    return None;
                };
                let target = match name.split_once("::") {
                    None => {
                        let exists = info.regexes.iter().any(|(n, _)| n == name);
                        if !exists {
                            errors.push(SystemError::UnknownName {
                                fqn: fqn.clone(),
                                name: name.clone(),
                            });
                            failed = true;
                            return None;
                        }
                        format!("{}::{}", info.name, name)
                    }
                    Some((prefix, local)) => {
                        let ns = if prefix == info.name {
                            Some(info.name.as_str())
                        } else {
                            info.imports
                                .iter()
                                .find(|(alias, _)| alias == prefix)
                                .map(|(_, ns)| ns.as_str())
                        };
                        let Some(ns) = ns else {
                            errors.push(SystemError::UnknownAlias {
                                fqn: fqn.clone(),
                                alias: prefix.to_string(),
                            });
                            failed = true;
                            return None;
                        };
                        let target = format!("{ns}::{local}");
                        if !self.index.contains_key(target.as_str()) {
                            errors.push(SystemError::UnknownName {
                                fqn: fqn.clone(),
                                name: target.clone(),
                            });
                            failed = true;
                            return None;
                        }
                        target
                    }
                };
                deps.push(target.clone());
                Some(RegexOpt::NamedRef { name: target })
            });

            self.errors.extend(errors);
            let item = &mut self.items[i];
            item.deps = deps;
            item.deps.sort();
            item.deps.dedup();
            item.failed |= failed;
            item.regex = Some(qualified);
        }
    }

    /// Replaces every `${$NAME}` with a literal from the environment
    /// lookup; the value must be printable-or-blank ASCII.
    fn env_pass(&mut self) {
        for i in 0..self.items.len() {
            let Some(regex) = self.items[i].regex.take() else {
                continue;
            };
            let fqn = self.items[i].fqn.clone();
            let unicode = regex.alphabet == Alphabet::Unicode;

            let mut failed = false;
            let mut errors = Vec::new();
            let injected = rewrite_regex(&regex, &mut |opt| {
                let RegexOpt::EnvRef { name } = opt else {
                    return None;
                };
                let Some(value) = self.env.and_then(|m| m.get(name.as_str())) else {
                    errors.push(SystemError::Env {
                        fqn: fqn.clone(),
                        name: name.clone(),
                        reason: "is not bound in the environment".to_string(),
                    });
                    failed = true;
                    return None;
                };
                if find_non_printable_byte(value).is_some() {
                    errors.push(SystemError::Env {
                        fqn: fqn.clone(),
                        name: name.clone(),
                        reason: "has a non-printable byte in its value".to_string(),
                    });
                    failed = true;
                    return None;
                }
                Some(RegexOpt::Literal {
                    codes: value.iter().map(|&b| b as u32).collect(),
                    unicode,
                })
            });

            self.errors.extend(errors);
            let item = &mut self.items[i];
            item.failed |= failed;
            item.regex = Some(injected);
        }
    }

    /// White/gray/black DFS; a back edge names everything on the gray
    /// stack from the re-entered node and fails the whole cycle.
    fn cycle_pass(&mut self) {
        let mut colors = vec![Color::White; self.items.len()];
        for i in 0..self.items.len() {
            if colors[i] == Color::White {
                let mut stack = Vec::new();
                self.dfs(i, &mut colors, &mut stack);
            }
        }
    }

    fn dfs(&mut self, i: usize, colors: &mut Vec<Color>, stack: &mut Vec<usize>) {
        colors[i] = Color::Gray;
        stack.push(i);
        for d in 0..self.items[i].deps.len() {
            let dep = self.items[i].deps[d].clone();
            let Some(&j) = self.index.get(dep.as_str()) else {
                continue;
            };
            match colors[j] {
                Color::White => self.dfs(j, colors, stack),
                Color::Gray => {
                    let from = stack.iter().position(|&s| s == j).expect("gray is on stack");
                    let members: Vec<usize> = stack[from..].to_vec();
                    self.errors.push(SystemError::Cycle {
                        names: members.iter().map(|&m| self.items[m].fqn.clone()).collect(),
                    });
                    for m in members {
                        self.items[m].failed = true;
                    }
                }
                Color::Black => {}
            }
        }
        stack.pop();
        colors[i] = Color::Black;
    }

    /// Resolves in dependency order, substituting each reference with its
    /// target's operator tree, then compiles executors.
    fn inline_and_compile(&mut self) -> ReSystem {
        // The subtree a reference site receives; only simple regexes (one
        // plain entry, no anchors) can stand in for a reference.
        let mut inline_opts: HashMap<String, Option<RegexOpt>> = HashMap::new();
        let mut sys = ReSystem::default();

        let order = self.resolution_order();
        for i in order {
            if self.items[i].failed {
                continue;
            }
            let Some(regex) = self.items[i].regex.take() else {
                continue;
            };
            let fqn = self.items[i].fqn.clone();

            let mut failed = false;
            let mut errors = Vec::new();
            let resolved = rewrite_regex(&regex, &mut |opt| {
                let RegexOpt::NamedRef { name } = opt else {
                    return None;
                };
                match inline_opts.get(name.as_str()) {
                    Some(Some(sub)) => Some(sub.clone()),
                    Some(None) => {
                        errors.push(SystemError::NotSimple {
                            fqn: fqn.clone(),
                            name: name.clone(),
                        });
                        failed = true;
                        None
                    }
                    // Target failed upstream; its error is already
                    // reported.
                    None => {
                        failed = true;
                        None
                    }
                }
            });
            self.errors.extend(errors);

            if failed {
                self.items[i].failed = true;
                continue;
            }

            inline_opts.insert(fqn.clone(), inlineable_opt(&resolved));
            match RegexCompiler::compile(&resolved) {
                Ok(executor) => {
                    sys.regexes.insert(fqn.clone(), resolved);
                    sys.executors.insert(fqn, executor);
                }
                Err(errs) => {
                    self.items[i].failed = true;
                    for err in errs {
                        self.errors.push(SystemError::Compile {
                            fqn: fqn.clone(),
                            err,
                        });
                    }
                }
            }
        }
        sys
    }

    /// Postorder over the dependency DAG (cycles already failed), so every
    /// target resolves before its reference sites.
    fn resolution_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.items.len());
        let mut seen = vec![false; self.items.len()];
        for i in 0..self.items.len() {
            self.postorder(i, &mut seen, &mut order);
        }
        order
    }

    fn postorder(&self, i: usize, seen: &mut Vec<bool>, order: &mut Vec<usize>) {
        if seen[i] || self.items[i].failed {
            seen[i] = true;
            return;
        }
        seen[i] = true;
        for dep in &self.items[i].deps {
            if let Some(&j) = self.index.get(dep.as_str()) {
                self.postorder(j, seen, order);
            }
        }
        order.push(i);
    }
}

/// The operator tree a reference to this regex resolves to: the body of a
/// single plain entry, with no anchors.
fn inlineable_opt(re: &Regex) -> Option<RegexOpt> {
    if re.pre_anchor.is_some() || re.post_anchor.is_some() {
        return None;
    }
    match &re.root {
        RegexComponent::Single(e) if !e.negated && !e.front_check && !e.back_check => {
            Some(e.opt.clone())
        }
        _ => None,
    }
}

/// Structurally copies a regex, letting `f` replace reference nodes.
fn rewrite_regex(re: &Regex, f: &mut impl FnMut(&RegexOpt) -> Option<RegexOpt>) -> Regex {
    let entry = |e: &ToplevelEntry, f: &mut dyn FnMut(&RegexOpt) -> Option<RegexOpt>| {
        ToplevelEntry {
            negated: e.negated,
            front_check: e.front_check,
            back_check: e.back_check,
            opt: rewrite_opt(&e.opt, f),
        }
    };
    Regex {
        kind: re.kind,
        alphabet: re.alphabet,
        pre_anchor: re.pre_anchor.as_ref().map(|a| entry(a, f)),
        root: match &re.root {
            RegexComponent::Single(e) => RegexComponent::Single(entry(e, f)),
            RegexComponent::AllOf(es) => {
                RegexComponent::AllOf(es.iter().map(|e| entry(e, f)).collect())
            }
        },
        post_anchor: re.post_anchor.as_ref().map(|a| entry(a, f)),
    }
}

fn rewrite_opt(opt: &RegexOpt, f: &mut dyn FnMut(&RegexOpt) -> Option<RegexOpt>) -> RegexOpt {
    if let Some(replacement) = f(opt) {
        return replacement;
    }
    match opt {
        RegexOpt::Literal { .. }
        | RegexOpt::CharRange { .. }
        | RegexOpt::Dot
        | RegexOpt::NamedRef { .. }
        | RegexOpt::EnvRef { .. } => opt.clone(),
        RegexOpt::Star(r) => RegexOpt::Star(Box::new(rewrite_opt(r, f))),
        RegexOpt::Plus(r) => RegexOpt::Plus(Box::new(rewrite_opt(r, f))),
        RegexOpt::Range { low, high, opt: r } => RegexOpt::Range {
            low: *low,
            high: *high,
            opt: Box::new(rewrite_opt(r, f)),
        },
        RegexOpt::Optional(r) => RegexOpt::Optional(Box::new(rewrite_opt(r, f))),
        RegexOpt::AnyOf(rs) => RegexOpt::AnyOf(rs.iter().map(|r| rewrite_opt(r, f)).collect()),
        RegexOpt::Sequence(rs) => {
            RegexOpt::Sequence(rs.iter().map(|r| rewrite_opt(r, f)).collect())
        }
        RegexOpt::Negate(r) => RegexOpt::Negate(Box::new(rewrite_opt(r, f))),
        RegexOpt::AllOf(rs) => RegexOpt::AllOf(rs.iter().map(|r| rewrite_opt(r, f)).collect()),
    }
}

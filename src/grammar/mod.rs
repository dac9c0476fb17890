//! Analysis and rewriting of context-free grammars: FIRST/FOLLOW sets, immediate left
//! recursion elimination and left factoring.
//!
//! This works on its own grammar description and shares nothing with the compiler
//! pipeline. Ordered containers keep every result, and its rendering, deterministic.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use tracing::{debug, trace};

pub mod demo;

/// Marks an empty derivation.
pub const EPSILON: &str = "ε";
/// Marks the end of input in FOLLOW sets.
pub const END_MARKER: &str = "$";

pub type Alternative = Vec<String>;
pub type SymbolSets = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grammar {
    pub start: String,
    pub nonterminals: BTreeSet<String>,
    pub terminals: BTreeSet<String>,
    pub productions: BTreeMap<String, Vec<Alternative>>,
}

impl Grammar {
    pub fn new(start: &str) -> Grammar {
        Grammar {
            start: start.to_owned(),
            ..Grammar::default()
        }
    }

    pub fn terminals<'a>(mut self, terminals: impl IntoIterator<Item = &'a str>) -> Grammar {
        self.terminals.extend(terminals.into_iter().map(str::to_owned));
        self
    }

    /// Adds `lhs -> alt1 | alt2 | ...`, declaring `lhs` as a nonterminal.
    pub fn production(mut self, lhs: &str, alternatives: &[&[&str]]) -> Grammar {
        self.nonterminals.insert(lhs.to_owned());
        self.productions.entry(lhs.to_owned()).or_default().extend(
            alternatives
                .iter()
                .map(|alt| alt.iter().map(|&sym| sym.to_owned()).collect::<Alternative>()),
        );
        self
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.contains(symbol)
    }

    /// Declared terminals, plus any symbol that is neither a nonterminal nor `ε`.
    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.contains(symbol) || (symbol != EPSILON && !self.is_nonterminal(symbol))
    }

    /// `base` followed by as many `'` as it takes to get an unused name.
    fn fresh_name(&self, base: &str) -> String {
        let mut name = format!("{base}'");
        while self.nonterminals.contains(&name) || self.terminals.contains(&name) {
            name.push('\'');
        }
        name
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (lhs, alternatives) in &self.productions {
            let rhs = alternatives
                .iter()
                .map(|alt| alt.join(" "))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{lhs} -> {rhs}")?;
        }
        Ok(())
    }
}

/// Computes FIRST for every terminal and nonterminal of `grammar`.
pub fn first_sets(grammar: &Grammar) -> SymbolSets {
    let mut first = SymbolSets::new();
    for terminal in &grammar.terminals {
        first.entry(terminal.clone()).or_default().insert(terminal.clone());
    }
    for nonterminal in &grammar.nonterminals {
        first.entry(nonterminal.clone()).or_default();
    }
    for symbol in grammar.productions.values().flatten().flatten() {
        if grammar.is_terminal(symbol) {
            first.entry(symbol.clone()).or_default().insert(symbol.clone());
        }
    }

    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut changed = false;
        for (lhs, alternatives) in &grammar.productions {
            for alt in alternatives {
                let additions = first_of_sequence(&first, alt);
                let set = first.entry(lhs.clone()).or_default();
                for symbol in additions {
                    changed |= set.insert(symbol);
                }
            }
        }

        if !changed {
            break;
        }
    }

    debug!(rounds, "FIRST sets converged");
    first
}

/// Computes FOLLOW for every nonterminal of `grammar`, given its FIRST sets.
pub fn follow_sets(grammar: &Grammar, first: &SymbolSets) -> SymbolSets {
    let mut follow: SymbolSets = grammar
        .nonterminals
        .iter()
        .map(|nonterminal| (nonterminal.clone(), BTreeSet::new()))
        .collect();
    if !grammar.start.is_empty() {
        follow
            .entry(grammar.start.clone())
            .or_default()
            .insert(END_MARKER.to_owned());
    }

    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut changed = false;
        for (lhs, alternatives) in &grammar.productions {
            for alt in alternatives {
                for (i, symbol) in alt.iter().enumerate() {
                    if !grammar.is_nonterminal(symbol) {
                        continue;
                    }

                    let rest = first_of_sequence(first, &alt[i + 1..]);
                    let mut additions: Vec<String> =
                        rest.iter().filter(|s| *s != EPSILON).cloned().collect();
                    if rest.contains(EPSILON) {
                        additions.extend(follow.get(lhs).into_iter().flatten().cloned());
                    }

                    let set = follow.entry(symbol.clone()).or_default();
                    for terminal in additions {
                        changed |= set.insert(terminal);
                    }
                }
            }
        }

        if !changed {
            break;
        }
    }

    debug!(rounds, "FOLLOW sets converged");
    follow
}

/// FIRST of a symbol string; contains `ε` iff every symbol in it is nullable.
fn first_of_sequence(first: &SymbolSets, sequence: &[String]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for symbol in sequence {
        if symbol == EPSILON {
            continue;
        }

        let Some(set) = first.get(symbol) else {
            out.insert(symbol.clone());
            return out;
        };
        out.extend(set.iter().filter(|s| *s != EPSILON).cloned());
        if !set.contains(EPSILON) {
            return out;
        }
    }

    out.insert(EPSILON.to_owned());
    out
}

/// Rewrites every immediately left-recursive `A -> A α | β` into
/// `A -> β A'` and `A' -> α A' | ε`.
pub fn eliminate_left_recursion(grammar: &Grammar) -> Grammar {
    let mut out = grammar.clone();

    for lhs in &grammar.nonterminals {
        let Some(alternatives) = out.productions.get(lhs) else {
            continue;
        };
        let (recursive, others): (Vec<_>, Vec<_>) = alternatives
            .iter()
            .cloned()
            .partition(|alt| alt.first() == Some(lhs));
        if recursive.is_empty() {
            continue;
        }

        let tail = out.fresh_name(lhs);
        out.nonterminals.insert(tail.clone());
        trace!(%lhs, %tail, "removing left recursion");

        let heads = others
            .into_iter()
            .map(|mut beta| {
                if beta == [EPSILON] {
                    beta.clear();
                }
                beta.push(tail.clone());
                beta
            })
            .collect();
        let mut tails: Vec<Alternative> = recursive
            .into_iter()
            .map(|mut alpha| {
                alpha.remove(0);
                alpha.push(tail.clone());
                alpha
            })
            .collect();
        tails.push(vec![EPSILON.to_owned()]);

        out.productions.insert(lhs.clone(), heads);
        out.productions.insert(tail, tails);
    }

    out
}

/// Repeatedly pulls the longest common prefix out of alternatives that share a first
/// symbol: `A -> p x | p y | z` becomes `A -> p A' | z` and `A' -> x | y`.
pub fn left_factor(grammar: &Grammar) -> Grammar {
    let mut out = grammar.clone();

    while let Some((lhs, prefix)) = common_prefix(&out) {
        let tail = out.fresh_name(&lhs);
        out.nonterminals.insert(tail.clone());
        trace!(%lhs, %tail, prefix = %prefix.join(" "), "left factoring");

        let alternatives = out.productions.remove(&lhs).unwrap_or_default();
        let (shared, others): (Vec<_>, Vec<_>) = alternatives
            .into_iter()
            .partition(|alt| alt.first() == prefix.first());

        let mut head = prefix.clone();
        head.push(tail.clone());
        let mut heads = vec![head];
        heads.extend(others);

        let tails = shared
            .into_iter()
            .map(|alt| {
                let suffix = alt[prefix.len()..].to_vec();
                if suffix.is_empty() {
                    vec![EPSILON.to_owned()]
                } else {
                    suffix
                }
            })
            .collect();

        out.productions.insert(lhs, heads);
        out.productions.insert(tail, tails);
    }

    out
}

/// Finds the first nonterminal with two or more alternatives sharing a first symbol,
/// returning it with their longest common prefix.
fn common_prefix(grammar: &Grammar) -> Option<(String, Alternative)> {
    for (lhs, alternatives) in &grammar.productions {
        let mut groups: BTreeMap<&str, Vec<&Alternative>> = BTreeMap::new();
        for alt in alternatives {
            match alt.first() {
                Some(first) if first != EPSILON => groups.entry(first).or_default().push(alt),
                _ => {}
            }
        }

        for group in groups.values() {
            let Some((first, rest)) = group.split_first() else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            let mut prefix: Alternative = first.to_vec();
            for alt in rest {
                let shared = prefix
                    .iter()
                    .zip(alt.iter())
                    .take_while(|(a, b)| a == b)
                    .count();
                prefix.truncate(shared);
            }

            if !prefix.is_empty() {
                return Some((lhs.clone(), prefix));
            }
        }
    }

    None
}

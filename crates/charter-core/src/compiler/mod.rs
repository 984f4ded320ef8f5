//! Guidance Compiler - guidance documents in, PolicyBundle out
//!
//! Compilation parses the root guidance file and an optional local override
//! file independently, merges them (local wins by rule id), classifies each
//! rule into the constitution or shard tier, and stamps the constitution
//! with a deterministic content hash.

pub mod parser;
pub mod tokens;

use crate::policy::{Constitution, PolicyBundle, Rule, Shard};
use crate::types::RuleOrigin;
use itertools::{Either, Itertools};
use std::collections::HashMap;

pub use parser::parse_guidance_file;
pub use tokens::{tokenize_bullet, BulletToken};

/// Compile root guidance plus an optional local override into a policy bundle.
///
/// Total: any input text compiles; empty or malformed guidance yields an
/// empty bundle. The constitution hash is a pure function of the input text.
pub fn compile(root_text: &str, local_text: Option<&str>) -> PolicyBundle {
    let root = parse_guidance_file(root_text, RuleOrigin::Root);
    let local = local_text
        .map(|text| parse_guidance_file(text, RuleOrigin::Local))
        .unwrap_or_default();

    let merged = merge_rules(root, local);

    let (constitution_rules, shard_rules): (Vec<Rule>, Vec<Rule>) =
        merged.into_iter().partition_map(|rule| {
            if rule.is_constitution {
                Either::Left(rule)
            } else {
                Either::Right(rule)
            }
        });

    let shards = shard_rules.into_iter().map(|rule| Shard { rule }).collect();
    PolicyBundle::new(Constitution::new(constitution_rules), shards)
}

/// Merge local rules over root rules.
///
/// A local rule whose id matches a root rule overrides its text and
/// metadata in place (the id and position are kept); ids unique to either
/// side are retained in insertion order.
pub fn merge_rules(root: Vec<Rule>, local: Vec<Rule>) -> Vec<Rule> {
    let mut merged = root;
    let mut by_id: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(position, rule)| (rule.id.clone(), position))
        .collect();

    for rule in local {
        match by_id.get(&rule.id) {
            Some(&position) => merged[position].override_with(rule),
            None => {
                by_id.insert(rule.id.clone(), merged.len());
                merged.push(rule);
            }
        }
    }

    merged
}

//! # forge-plan
//!
//! Turns a requested set of target names into a concrete, ordered execution
//! list: the dependency closure of what was asked for, topologically sorted,
//! with any `--skip`ped targets neutralized in place.

use std::collections::{BTreeSet, HashMap, HashSet};

use forge_types::{Build, Error, Result, TargetId};

/// The result of planning one invocation: which targets will run, in what
/// order, and which were explicitly skipped.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Topologically ordered closure: every target that will be evaluated,
    /// including ones that end up skipped.
    pub order: Vec<TargetId>,
    /// `order`, minus skipped targets — the ids the requirement validator
    /// checks and the executor actually runs actions for.
    pub executing_order: Vec<TargetId>,
    pub invoked: Vec<String>,
    pub skipped: Vec<String>,
    pub executing: Vec<String>,
}

/// Computes the dependency closure of `requested`, orders it deterministically,
/// and marks every target named in `skip` so the executor records it as
/// `Skipped` instead of running its actions.
///
/// In `strict` mode, a name in `skip` that does not appear anywhere in the
/// computed closure is an error rather than a silent no-op, and the sort
/// itself rejects any point where more than one target is simultaneously
/// independent — the build author has to declare a total order instead of
/// leaving it to whichever tie-break the planner would otherwise pick.
pub fn plan(build: &mut Build, requested: &[String], skip: &[String], strict: bool) -> Result<Plan> {
    let roots: Vec<TargetId> = requested
        .iter()
        .map(|name| build.resolve(name))
        .collect::<Result<_>>()?;

    let closure = dependency_closure(build, &roots);
    let order = topo_sort(build, &closure, strict)?;

    let skip_ids = resolve_skip_targets(build, skip, &closure, strict)?;
    for id in &skip_ids {
        build.target_mut(*id).force_skip();
    }

    let invoked: Vec<String> = order.iter().map(|id| build.target(*id).name().to_string()).collect();
    let skipped: Vec<String> = skip_ids.iter().map(|id| build.target(*id).name().to_string()).collect();
    let executing_order: Vec<TargetId> = order.iter().copied().filter(|id| !skip_ids.contains(id)).collect();
    let executing: Vec<String> = executing_order
        .iter()
        .map(|id| build.target(*id).name().to_string())
        .collect();

    build.set_name_lists(invoked.clone(), skipped.clone(), executing.clone());

    Ok(Plan {
        order,
        executing_order,
        invoked,
        skipped,
        executing,
    })
}

fn dependency_closure(build: &Build, roots: &[TargetId]) -> HashSet<TargetId> {
    let mut seen: HashSet<TargetId> = HashSet::new();
    let mut stack: Vec<TargetId> = roots.to_vec();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        for dep in build.target(id).dependencies() {
            stack.push(*dep);
        }
    }
    seen
}

fn resolve_skip_targets(
    build: &Build,
    skip: &[String],
    closure: &HashSet<TargetId>,
    strict: bool,
) -> Result<Vec<TargetId>> {
    let mut ids = Vec::new();
    for name in skip {
        let id = build.resolve(name)?;
        if !closure.contains(&id) && strict {
            return Err(Error::planning(format!(
                "--skip '{name}' does not name a target in the requested build's dependency closure"
            )));
        }
        if closure.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Kahn's algorithm over the closure, with a `(name, id)`-keyed ready set so
/// independent targets always come out in name order regardless of how the
/// caller declared them. In `strict` mode, a ready set with more than one
/// member at any step means the build author never declared an order
/// between those targets, which fails the plan instead of picking one for
/// them.
fn topo_sort(build: &Build, closure: &HashSet<TargetId>, strict: bool) -> Result<Vec<TargetId>> {
    let mut indegree: HashMap<TargetId, usize> = HashMap::new();
    let mut dependents_of: HashMap<TargetId, Vec<TargetId>> = HashMap::new();

    for &id in closure {
        let deps_in_closure = build
            .target(id)
            .dependencies()
            .iter()
            .filter(|d| closure.contains(d))
            .count();
        indegree.insert(id, deps_in_closure);
        for dep in build.target(id).dependencies() {
            if closure.contains(dep) {
                dependents_of.entry(*dep).or_default().push(id);
            }
        }
    }

    let mut ready: BTreeSet<(String, TargetId)> = BTreeSet::new();
    for (&id, &deg) in &indegree {
        if deg == 0 {
            ready.insert((build.target(id).name().to_string(), id));
        }
    }

    let mut out: Vec<TargetId> = Vec::with_capacity(closure.len());
    while let Some((name, id)) = ready.iter().next().cloned() {
        if strict && ready.len() > 1 {
            let mut ambiguous: Vec<&str> = ready.iter().map(|(n, _)| n.as_str()).collect();
            ambiguous.sort_unstable();
            return Err(Error::planning(format!(
                "incomplete target definition order: {} could run in any order",
                ambiguous.join(", ")
            )));
        }
        ready.remove(&(name, id));
        out.push(id);

        if let Some(dependents) = dependents_of.get(&id) {
            for &dependent in dependents {
                let deg = indegree.get_mut(&dependent).expect("closure member must have an indegree entry");
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    ready.insert((build.target(dependent).name().to_string(), dependent));
                }
            }
        }
    }

    if out.len() != closure.len() {
        let stuck: Vec<TargetId> = closure
            .iter()
            .copied()
            .filter(|id| !out.contains(id))
            .collect();
        return Err(Error::planning(format!(
            "dependency cycle detected: {}",
            describe_cycle(build, &stuck)
        )));
    }

    Ok(out)
}

/// Walks dependency edges among the still-unresolved nodes until a name
/// repeats, producing an `A -> B -> C -> A` trail for the error message.
fn describe_cycle(build: &Build, stuck: &[TargetId]) -> String {
    let stuck_set: HashSet<TargetId> = stuck.iter().copied().collect();
    let Some(&start) = stuck.first() else {
        return "<empty>".to_string();
    };

    let mut path = vec![start];
    let mut current = start;
    let mut visited: HashSet<TargetId> = HashSet::new();
    visited.insert(start);

    loop {
        let next = build
            .target(current)
            .dependencies()
            .iter()
            .copied()
            .find(|d| stuck_set.contains(d));
        let Some(next) = next else { break };
        path.push(next);
        if !visited.insert(next) {
            break;
        }
        current = next;
    }

    path.iter()
        .map(|id| build.target(*id).name())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap as StdHashMap;

    fn make_build(edges: &[(&str, &[&str])], default: Option<&str>) -> Build {
        use forge_types::test_support::target_with_deps;
        use forge_types::ParameterTable;

        let names: Vec<&str> = edges.iter().map(|(n, _)| *n).collect();
        let mut by_name = StdHashMap::new();
        for (i, name) in names.iter().enumerate() {
            by_name.insert(name.to_ascii_lowercase(), TargetId(i));
        }
        let targets = edges
            .iter()
            .map(|(name, deps)| {
                target_with_deps(
                    name,
                    deps.iter().map(|d| by_name[&d.to_ascii_lowercase()]).collect(),
                )
            })
            .collect();
        let default_target = default.map(|d| by_name[&d.to_ascii_lowercase()]);
        Build::new(targets, by_name, default_target, ParameterTable::new())
    }

    #[test]
    fn orders_dependencies_before_dependents() {
        let mut build = make_build(&[("compile", &[]), ("test", &["compile"])], Some("test"));
        let result = plan(&mut build, &["test".to_string()], &[], false).unwrap();
        assert_eq!(result.executing, vec!["compile", "test"]);
    }

    #[test]
    fn independent_targets_order_by_name() {
        let mut build = make_build(
            &[("zeta", &[]), ("alpha", &[]), ("top", &["zeta", "alpha"])],
            Some("top"),
        );
        let result = plan(&mut build, &["top".to_string()], &[], false).unwrap();
        assert_eq!(result.executing, vec!["alpha", "zeta", "top"]);
    }

    #[test]
    fn closure_excludes_unrelated_targets() {
        let mut build = make_build(
            &[("compile", &[]), ("lint", &[]), ("test", &["compile"])],
            Some("test"),
        );
        let result = plan(&mut build, &["test".to_string()], &[], false).unwrap();
        assert!(!result.executing.contains(&"lint".to_string()));
    }

    #[test]
    fn skip_keeps_target_in_order_but_out_of_executing() {
        let mut build = make_build(&[("compile", &[]), ("test", &["compile"])], Some("test"));
        let result = plan(&mut build, &["test".to_string()], &["compile".to_string()], false).unwrap();
        assert_eq!(result.order.len(), 2);
        assert_eq!(result.executing, vec!["test"]);
        assert_eq!(result.skipped, vec!["compile"]);
    }

    #[test]
    fn strict_mode_rejects_skip_outside_closure() {
        let mut build = make_build(&[("compile", &[]), ("lint", &[])], Some("compile"));
        let err = plan(&mut build, &["compile".to_string()], &["lint".to_string()], true).unwrap_err();
        assert!(err.to_string().contains("dependency closure"));
    }

    #[test]
    fn strict_mode_rejects_ambiguous_independent_targets() {
        let mut build = make_build(
            &[("x", &[]), ("y", &[]), ("z", &["x", "y"])],
            Some("z"),
        );
        let err = plan(&mut build, &["z".to_string()], &[], true).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("incomplete target definition order"));
        assert!(msg.contains('x'));
        assert!(msg.contains('y'));
    }

    #[test]
    fn non_strict_mode_resolves_the_same_ambiguity_deterministically() {
        let mut build = make_build(
            &[("x", &[]), ("y", &[]), ("z", &["x", "y"])],
            Some("z"),
        );
        let result = plan(&mut build, &["z".to_string()], &[], false).unwrap();
        assert_eq!(result.executing, vec!["x", "y", "z"]);
    }

    #[test]
    fn lenient_mode_ignores_skip_outside_closure() {
        let mut build = make_build(&[("compile", &[]), ("lint", &[])], Some("compile"));
        let result = plan(&mut build, &["compile".to_string()], &["lint".to_string()], false).unwrap();
        assert_eq!(result.executing, vec!["compile"]);
    }

    #[test]
    fn cycle_is_reported_with_a_trail() {
        let mut build = make_build(&[("a", &["b"]), ("b", &["a"])], None);
        let err = plan(&mut build, &["a".to_string()], &[], false).unwrap_err();
        assert!(err.to_string().contains("cycle"));
        assert!(err.to_string().contains("->"));
    }

    #[test]
    fn unknown_requested_target_errors() {
        let mut build = make_build(&[("compile", &[])], Some("compile"));
        assert!(plan(&mut build, &["missing".to_string()], &[], false).is_err());
    }

    proptest! {
        #[test]
        fn independent_targets_always_order_by_name_regardless_of_declaration_order(
            names in prop::collection::hash_set("[a-z]{3,8}", 1..8usize)
                .prop_map(|set| set.into_iter().filter(|n| n != "root").collect::<Vec<_>>())
                .prop_filter("need at least one non-root name", |names| !names.is_empty())
        ) {
            // `root` depends on every generated name; none of them depend on
            // each other, so the only thing that can decide their relative
            // order is the name itself, never the declaration order.
            let mut expected = names.clone();
            expected.sort();

            let dep_refs: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
            let mut edges: Vec<(&str, &[&str])> = names.iter().map(|n| (n.as_str(), &[][..])).collect();
            edges.push(("root", &dep_refs[..]));

            let mut build = make_build(&edges, Some("root"));
            let result = plan(&mut build, &["root".to_string()], &[], false).unwrap();

            prop_assert_eq!(&result.executing[..result.executing.len() - 1], expected.as_slice());
            prop_assert_eq!(result.executing.last().unwrap(), "root");
        }
    }
}

//! Static analysis of the dependency graph, without constructing anything.

use crate::declaration::Parameter;
use crate::error::{ElementError, Result};
use crate::registry::Registry;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
  Unvisited,
  OnStack,
  Done,
}

/// Checks that every element dependency of every active declaration can be
/// looked up unambiguously and that the graph has no cycles.
///
/// All problems are collected into one [`ElementError::Validation`].
pub(crate) fn check(registry: &Registry) -> Result<()> {
  let contexts = registry.contexts();
  let mut problems = Vec::new();
  let mut edges: Vec<Vec<usize>> = vec![Vec::new(); contexts.len()];

  for (index, context) in contexts.iter().enumerate() {
    let declaration = context.declaration();
    let dependencies = declaration.site().owner().into_iter().chain(
      declaration
        .parameters()
        .iter()
        .filter_map(|parameter| match parameter {
          Parameter::Element(dependency) => Some(dependency),
          Parameter::Property(_) => None,
        }),
    );

    for dependency in dependencies {
      match registry.lookup(dependency) {
        Ok(target) => {
          if let Some(target) = registry.position(target.name()) {
            edges[index].push(target);
          }
        }
        Err(error) if dependency.is_optional() && error.is_not_found() => {}
        Err(error) => problems.push(ElementError::Unsatisfied {
          element: context.name().to_owned(),
          cause: Box::new(error),
        }),
      }
    }
  }

  let mut marks = vec![Mark::Unvisited; contexts.len()];
  let mut stack = Vec::new();
  let mut cycles = Vec::new();
  for start in 0..contexts.len() {
    if marks[start] == Mark::Unvisited {
      visit(start, &edges, &mut marks, &mut stack, &mut cycles);
    }
  }
  problems.extend(cycles.into_iter().map(|cycle| ElementError::CircularDependency {
    cycle: cycle
      .into_iter()
      .map(|index| contexts[index].name().to_owned())
      .collect(),
  }));

  if problems.is_empty() {
    Ok(())
  } else {
    Err(ElementError::Validation { problems })
  }
}

fn visit(
  node: usize,
  edges: &[Vec<usize>],
  marks: &mut [Mark],
  stack: &mut Vec<usize>,
  cycles: &mut Vec<Vec<usize>>,
) {
  marks[node] = Mark::OnStack;
  stack.push(node);
  for &next in &edges[node] {
    match marks[next] {
      Mark::Unvisited => visit(next, edges, marks, stack, cycles),
      Mark::OnStack => {
        let start = stack.iter().position(|&n| n == next).unwrap_or(0);
        let mut cycle = stack[start..].to_vec();
        cycle.push(next);
        cycles.push(cycle);
      }
      Mark::Done => {}
    }
  }
  stack.pop();
  marks[node] = Mark::Done;
}

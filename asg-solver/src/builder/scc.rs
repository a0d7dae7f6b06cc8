//! Non-recursive Tarjan strongly connected components, over the positive atom dependency graph.
//!
//! Ground ASP programs can be deep (long chains of rules), so this is written iteratively with an
//! explicit work stack rather than recursively, to avoid blowing the native stack.

use asg_formula::lit::Var;

struct NodeState {
    index: Option<u32>,
    lowlink: u32,
    on_stack: bool,
}

/// One entry of the explicit call stack: the vertex being visited, its successor list and the
/// index of the successor we're about to look at next.
struct Frame {
    v: Var,
    succs: Vec<Var>,
    pos: usize,
}

/// Computes strongly connected components of the graph `successors(v)` over the vertex set
/// `0..n`, returning one `Vec<Var>` per component in an unspecified order.
pub fn tarjan_scc(n: usize, successors: impl Fn(Var) -> Vec<Var>) -> Vec<Vec<Var>> {
    let mut state: Vec<NodeState> = (0..n)
        .map(|_| NodeState {
            index: None,
            lowlink: 0,
            on_stack: false,
        })
        .collect();
    let mut stack: Vec<Var> = Vec::new();
    let mut next_index = 0u32;
    let mut result = Vec::new();

    for start in 0..n {
        let start = Var::from_index(start);
        if state[start.index()].index.is_some() {
            continue;
        }

        let mut work = vec![new_frame(start, &successors)];
        state[start.index()].index = Some(next_index);
        state[start.index()].lowlink = next_index;
        next_index += 1;
        stack.push(start);
        state[start.index()].on_stack = true;

        while let Some(frame) = work.last_mut() {
            if frame.pos >= frame.succs.len() {
                let v = frame.v;
                work.pop();

                if state[v.index()].lowlink == state[v.index()].index.unwrap() {
                    let mut component = Vec::new();
                    loop {
                        let w = stack.pop().unwrap();
                        state[w.index()].on_stack = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    result.push(component);
                }

                if let Some(parent) = work.last() {
                    let v_low = state[v.index()].lowlink;
                    if v_low < state[parent.v.index()].lowlink {
                        state[parent.v.index()].lowlink = v_low;
                    }
                }
                continue;
            }

            let w = frame.succs[frame.pos];
            frame.pos += 1;
            let v = frame.v;

            if state[w.index()].index.is_none() {
                state[w.index()].index = Some(next_index);
                state[w.index()].lowlink = next_index;
                next_index += 1;
                stack.push(w);
                state[w.index()].on_stack = true;
                work.push(new_frame(w, &successors));
            } else if state[w.index()].on_stack {
                let w_index = state[w.index()].index.unwrap();
                if w_index < state[v.index()].lowlink {
                    state[v.index()].lowlink = w_index;
                }
            }
        }
    }

    result
}

fn new_frame(v: Var, successors: &impl Fn(Var) -> Vec<Var>) -> Frame {
    Frame {
        v,
        succs: successors(v),
        pos: 0,
    }
}

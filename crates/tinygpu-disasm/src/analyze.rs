use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;
use tinygpu_asm::decoder::decode;
use tinygpu_asm::tables::Op;

use crate::model::Image;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind { Fallthrough, CondBranch }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge { pub from: usize, pub to: usize, pub kind: EdgeKind }

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub entries: Vec<usize>,
    pub reached: BTreeSet<usize>,
    pub edges: Vec<Edge>,
    pub rets: BTreeSet<usize>,
    pub labels: BTreeMap<usize, String>,
}

/// Walks control flow from `entries`. A branch with no condition bits never
/// fires, so it only falls through; RET ends a path.
pub fn analyze(img: &Image, entries: &[usize]) -> Report {
    let mut rep = Report { entries: entries.to_vec(), ..Report::default() };
    let mut queue: VecDeque<usize> = entries.iter().copied().filter(|&e| img.is_mapped(e)).collect();
    while let Some(pc) = queue.pop_front() {
        if !rep.reached.insert(pc) { continue; }
        let Some(word) = img.word(pc) else { continue };
        let Ok(d) = decode(word) else { continue };
        let ft = pc + 1;
        match d.op {
            Op::Ret => { rep.rets.insert(pc); }
            Op::Br if !d.cond.is_empty() => {
                let tgt = d.target as usize;
                rep.edges.push(Edge { from: pc, to: tgt, kind: EdgeKind::CondBranch });
                rep.labels.entry(tgt).or_insert_with(|| format!("L_{tgt}"));
                if img.is_mapped(tgt) {
                    queue.push_back(tgt);
                }
                if img.is_mapped(ft) {
                    rep.edges.push(Edge { from: pc, to: ft, kind: EdgeKind::Fallthrough });
                    queue.push_back(ft);
                }
            }
            _ => {
                if img.is_mapped(ft) {
                    rep.edges.push(Edge { from: pc, to: ft, kind: EdgeKind::Fallthrough });
                    queue.push_back(ft);
                }
            }
        }
    }
    for &e in entries { rep.labels.entry(e).or_insert_with(|| format!("entry_{e}")); }
    rep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_edges_and_ret() {
        // 0: CONST R1, #0 / 1: CMP R1, R2 / 2: BRn 1 / 3: RET / 4: NOP (unreached)
        let words = vec![0x9100, 0x2012, 0x1801, 0xF000, 0x0000];
        let img = Image { base: 0, words };
        let rep = analyze(&img, &[0]);
        assert!(rep.edges.contains(&Edge { from: 2, to: 1, kind: EdgeKind::CondBranch }));
        assert!(rep.rets.contains(&3));
        assert!(!rep.reached.contains(&4));
        assert_eq!(rep.labels.get(&1).map(String::as_str), Some("L_1"));
        assert_eq!(rep.labels.get(&0).map(String::as_str), Some("entry_0"));
    }

    #[test]
    fn never_branch_only_falls_through() {
        let img = Image { base: 0, words: vec![0x1003, 0xF000] };
        let rep = analyze(&img, &[0]);
        assert_eq!(rep.edges, vec![Edge { from: 0, to: 1, kind: EdgeKind::Fallthrough }]);
    }
}

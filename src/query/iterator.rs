//! Per-pattern leapfrog iterator over the ring.
//!
//! Holds one interval per attribute trie and one bound-value slot per attribute. Which ring
//! operation a `down` or `leap` maps to depends only on which sibling attributes are currently
//! bound; the bound slots drive that dispatch. Constants of the pattern are descended at
//! construction time, back-to-front along the cycle so that no forward step is ever needed.

use crate::containers::BitSeq;
use crate::ring::{BwtInterval, Ring};
use crate::{Id, VarId};

use super::{Term, TriplePattern};

pub struct PatternIter<'a, B: BitSeq> {
    pattern: TriplePattern,
    ring: &'a Ring<B>,
    i_s: BwtInterval,
    i_p: BwtInterval,
    i_o: BwtInterval,
    cur_s: Option<Id>,
    cur_p: Option<Id>,
    cur_o: Option<Id>,
    empty: bool,
}

impl<'a, B: BitSeq> PatternIter<'a, B> {
    /// Builds the iterator and descends the pattern's constants. A constant that does not occur
    /// (alone or in combination) marks the iterator empty, which voids the whole query.
    pub fn new(pattern: TriplePattern, ring: &'a Ring<B>) -> Self {
        let mut it = PatternIter {
            pattern,
            ring,
            i_s: ring.open(),
            i_p: ring.open(),
            i_o: ring.open(),
            cur_s: None,
            cur_p: None,
            cur_o: None,
            empty: false,
        };
        match (pattern.s.constant(), pattern.p.constant(), pattern.o.constant()) {
            (Some(s), Some(p), Some(o)) => {
                // S -> O -> P, backward steps only
                if it.fix_s(s) && it.fix_o_under_s(o) {
                    let found = it.ring.next_p_in_so(&it.i_p, p);
                    if found == p {
                        it.cur_p = Some(p);
                    } else {
                        it.empty = true;
                    }
                }
            }
            (Some(s), Some(p), None) => {
                // P -> S
                if it.fix_p(p) {
                    let found = it.ring.next_s_in_p(&it.i_s, s);
                    if found == s {
                        it.cur_s = Some(s);
                        it.i_o = it.ring.down_p_s(&it.i_s, s);
                    } else {
                        it.empty = true;
                    }
                }
            }
            (None, Some(p), Some(o)) => {
                // O -> P
                if it.fix_o(o) {
                    let found = it.ring.next_p_in_o(&it.i_p, p);
                    if found == p {
                        it.cur_p = Some(p);
                        it.i_s = it.ring.down_o_p(&it.i_p, p);
                    } else {
                        it.empty = true;
                    }
                }
            }
            (Some(s), None, Some(o)) => {
                // S -> O
                if it.fix_s(s) {
                    it.fix_o_under_s(o);
                }
            }
            (Some(s), None, None) => {
                if it.fix_s(s) {
                    it.i_p = it.i_o;
                }
            }
            (None, Some(p), None) => {
                if it.fix_p(p) {
                    it.i_o = it.i_s;
                }
            }
            (None, None, Some(o)) => {
                if it.fix_o(o) {
                    it.i_s = it.i_p;
                }
            }
            (None, None, None) => {}
        }
        it
    }

    // Verifies the subject constant and opens its interval in i_o.
    fn fix_s(&mut self, s: Id) -> bool {
        if self.ring.next_s(&self.i_s, s) != s {
            self.empty = true;
            return false;
        }
        self.cur_s = Some(s);
        self.i_o = self.ring.down_s(s);
        true
    }

    // Verifies the predicate constant and opens its interval in i_s.
    fn fix_p(&mut self, p: Id) -> bool {
        if self.ring.next_p(&self.i_p, p) != p {
            self.empty = true;
            return false;
        }
        self.cur_p = Some(p);
        self.i_s = self.ring.down_p(p);
        true
    }

    // Verifies the object constant and opens its interval in i_p.
    fn fix_o(&mut self, o: Id) -> bool {
        if self.ring.next_o(&self.i_o, o) != o {
            self.empty = true;
            return false;
        }
        self.cur_o = Some(o);
        self.i_p = self.ring.down_o(o);
        true
    }

    // Verifies the object constant inside the already-open subject interval and descends to i_p.
    fn fix_o_under_s(&mut self, o: Id) -> bool {
        if self.ring.next_o_in_s(&self.i_o, o) != o {
            self.empty = true;
            return false;
        }
        self.cur_o = Some(o);
        self.i_p = self.ring.down_s_o(&self.i_o, o);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// The bound values of the three positions, constants included.
    pub fn bound(&self) -> (Option<Id>, Option<Id>, Option<Id>) {
        (self.cur_s, self.cur_p, self.cur_o)
    }

    fn is_var_s(&self, var: VarId) -> bool {
        self.pattern.s == Term::Variable(var)
    }

    fn is_var_p(&self, var: VarId) -> bool {
        self.pattern.p == Term::Variable(var)
    }

    fn is_var_o(&self, var: VarId) -> bool {
        self.pattern.o == Term::Variable(var)
    }

    /// Binds `var := c` and descends the matching trie edge. At the last level both sibling
    /// attributes are already bound and the row interval cannot narrow further, so nothing moves.
    pub fn down(&mut self, var: VarId, c: Id) {
        if self.is_var_s(var) {
            match (self.cur_p, self.cur_o) {
                (Some(_), Some(_)) => return,
                (None, Some(o)) => self.i_p = self.ring.down_o_s(&self.i_s, o, c),
                (Some(_), None) => self.i_o = self.ring.down_p_s(&self.i_s, c),
                (None, None) => {
                    let i = self.ring.down_s(c);
                    self.i_o = i;
                    self.i_p = i;
                }
            }
            self.cur_s = Some(c);
        } else if self.is_var_p(var) {
            match (self.cur_s, self.cur_o) {
                (Some(_), Some(_)) => return,
                (None, Some(_)) => self.i_s = self.ring.down_o_p(&self.i_p, c),
                (Some(s), None) => self.i_o = self.ring.down_s_p(&self.i_p, s, c),
                (None, None) => {
                    let i = self.ring.down_p(c);
                    self.i_s = i;
                    self.i_o = i;
                }
            }
            self.cur_p = Some(c);
        } else if self.is_var_o(var) {
            match (self.cur_s, self.cur_p) {
                (Some(_), Some(_)) => return,
                (None, Some(p)) => self.i_s = self.ring.down_p_o(&self.i_o, p, c),
                (Some(_), None) => self.i_p = self.ring.down_s_o(&self.i_o, c),
                (None, None) => {
                    let i = self.ring.down_o(c);
                    self.i_s = i;
                    self.i_p = i;
                }
            }
            self.cur_o = Some(c);
        }
    }

    /// Unbinds the variable. Intervals are never rolled back: the next `down` through this state
    /// overwrites them, so clearing the bound slot is all that "up" means.
    pub fn up(&mut self, var: VarId) {
        if self.is_var_s(var) {
            self.cur_s = None;
        } else if self.is_var_p(var) {
            self.cur_p = None;
        } else if self.is_var_o(var) {
            self.cur_o = None;
        }
    }

    /// Smallest value the variable can take in the current state, 0 if none.
    pub fn leap(&mut self, var: VarId) -> Id {
        if self.is_var_s(var) {
            match (self.cur_p, self.cur_o) {
                (Some(_), Some(_)) => self.ring.min_s_in_po(&self.i_s),
                (None, Some(o)) => self.ring.min_s_in_o(&mut self.i_s, o),
                (Some(_), None) => self.ring.min_s_in_p(&self.i_s),
                (None, None) => self.ring.min_s(&self.i_s),
            }
        } else if self.is_var_p(var) {
            match (self.cur_s, self.cur_o) {
                (Some(_), Some(_)) => self.ring.min_p_in_so(&self.i_p),
                (Some(s), None) => self.ring.min_p_in_s(&mut self.i_p, s),
                (None, Some(_)) => self.ring.min_p_in_o(&self.i_p),
                (None, None) => self.ring.min_p(&self.i_p),
            }
        } else if self.is_var_o(var) {
            match (self.cur_s, self.cur_p) {
                (Some(_), Some(_)) => self.ring.min_o_in_sp(&self.i_o),
                (Some(_), None) => self.ring.min_o_in_s(&self.i_o),
                (None, Some(p)) => self.ring.min_o_in_p(&mut self.i_o, p),
                (None, None) => self.ring.min_o(&self.i_o),
            }
        } else {
            0
        }
    }

    /// Least value `>= c` the variable can take in the current state, 0 if none.
    pub fn leap_from(&mut self, var: VarId, c: Id) -> Id {
        if self.is_var_s(var) {
            match (self.cur_p, self.cur_o) {
                (Some(_), Some(_)) => self.ring.next_s_in_po(&self.i_s, c),
                (None, Some(o)) => self.ring.next_s_in_o(&mut self.i_s, o, c),
                (Some(_), None) => self.ring.next_s_in_p(&self.i_s, c),
                (None, None) => self.ring.next_s(&self.i_s, c),
            }
        } else if self.is_var_p(var) {
            match (self.cur_s, self.cur_o) {
                (Some(_), Some(_)) => self.ring.next_p_in_so(&self.i_p, c),
                (Some(s), None) => self.ring.next_p_in_s(&mut self.i_p, s, c),
                (None, Some(_)) => self.ring.next_p_in_o(&self.i_p, c),
                (None, None) => self.ring.next_p(&self.i_p, c),
            }
        } else if self.is_var_o(var) {
            match (self.cur_s, self.cur_p) {
                (Some(_), Some(_)) => self.ring.next_o_in_sp(&self.i_o, c),
                (Some(_), None) => self.ring.next_o_in_s(&self.i_o, c),
                (None, Some(p)) => self.ring.next_o_in_p(&mut self.i_o, p, c),
                (None, None) => self.ring.next_o(&self.i_o, c),
            }
        } else {
            0
        }
    }

    /// Whether two of the three positions are bound, leaving a single last-level range.
    pub fn in_last_level(&self) -> bool {
        let bound = [self.cur_s, self.cur_p, self.cur_o].iter().filter(|c| c.is_some()).count();
        bound >= 2
    }

    /// All distinct values of the variable in the current interval. Only meaningful in the last
    /// level, where the remaining attribute ranges over one contiguous row range.
    pub fn seek_all(&self, var: VarId) -> Vec<Id> {
        if self.is_var_s(var) {
            self.ring.all_s_in_range(&self.i_s)
        } else if self.is_var_p(var) {
            self.ring.all_p_in_range(&self.i_p)
        } else if self.is_var_o(var) {
            self.ring.all_o_in_range(&self.i_o)
        } else {
            Vec::new()
        }
    }

    /// Size of the interval the next free attribute ranges over; the planner's cardinality
    /// estimate for this pattern.
    pub fn interval_size(&self) -> usize {
        match (self.cur_s.is_some(), self.cur_p.is_some(), self.cur_o.is_some()) {
            (false, false, false) => self.i_s.len(),
            (false, true, false) => self.i_s.len(), // i_s == i_o
            (false, false, true) => self.i_s.len(), // i_s == i_p
            (true, false, false) => self.i_o.len(), // i_o == i_p
            (true, true, false) => self.i_o.len(),
            (true, false, true) => self.i_p.len(),
            (false, true, true) => self.i_s.len(),
            (true, true, true) => 0,
        }
    }
}

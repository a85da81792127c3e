//! Snapshot of the logistics problem: jigs, belugas, trailers, racks,
//! production lines, hangars, and the subgoal counters used for evaluation.

use std::fmt;

/// Index into a snapshot's jig registry.
pub type JigId = usize;

/// Default depth penalty for [`ProblemState::evaluate`].
pub const DEFAULT_MU: f32 = 0.05;

/// The five canonical jig types.
///
/// Equality is by variant, matching the source data where types are
/// identified by name only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JigTypeId {
    TypeA,
    TypeB,
    TypeC,
    TypeD,
    TypeE,
}

impl JigTypeId {
    pub const ALL: [JigTypeId; 5] = [
        JigTypeId::TypeA,
        JigTypeId::TypeB,
        JigTypeId::TypeC,
        JigTypeId::TypeD,
        JigTypeId::TypeE,
    ];

    pub fn name(self) -> &'static str {
        match self {
            JigTypeId::TypeA => "typeA",
            JigTypeId::TypeB => "typeB",
            JigTypeId::TypeC => "typeC",
            JigTypeId::TypeD => "typeD",
            JigTypeId::TypeE => "typeE",
        }
    }

    pub fn size_empty(self) -> u32 {
        match self {
            JigTypeId::TypeA => 4,
            JigTypeId::TypeB => 8,
            JigTypeId::TypeC => 9,
            JigTypeId::TypeD => 18,
            JigTypeId::TypeE => 32,
        }
    }

    pub fn size_loaded(self) -> u32 {
        match self {
            JigTypeId::TypeA => 4,
            JigTypeId::TypeB => 11,
            JigTypeId::TypeC => 18,
            JigTypeId::TypeD => 25,
            JigTypeId::TypeE => 32,
        }
    }

    /// Parse a canonical type name (`typeA` .. `typeE`).
    pub fn parse(name: &str) -> Option<JigTypeId> {
        match name {
            "typeA" => Some(JigTypeId::TypeA),
            "typeB" => Some(JigTypeId::TypeB),
            "typeC" => Some(JigTypeId::TypeC),
            "typeD" => Some(JigTypeId::TypeD),
            "typeE" => Some(JigTypeId::TypeE),
            _ => None,
        }
    }
}

impl fmt::Display for JigTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A piece of cargo: a type plus an empty/loaded flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jig {
    pub type_id: JigTypeId,
    pub empty: bool,
}

impl Jig {
    pub fn new(type_id: JigTypeId, empty: bool) -> Self {
        Self { type_id, empty }
    }

    /// Footprint of the jig in its current load state.
    pub fn size(&self) -> u32 {
        if self.empty {
            self.type_id.size_empty()
        } else {
            self.type_id.size_loaded()
        }
    }
}

/// Capacity-bounded double-ended buffer of jigs.
///
/// Index 0 is the front (beluga side); the last index is the back
/// (factory side).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rack {
    pub capacity: u32,
    pub jigs: Vec<JigId>,
}

impl Rack {
    pub fn new(capacity: u32, jigs: Vec<JigId>) -> Self {
        Self { capacity, jigs }
    }

    /// Sum of the sizes of the contained jigs.
    pub fn used_space(&self, registry: &[Jig]) -> u32 {
        self.jigs
            .iter()
            .map(|&id| registry.get(id).map(|j| j.size()).unwrap_or(0))
            .sum()
    }

    /// Remaining capacity. Negative only for states that violate the
    /// capacity invariant (rejected at load time).
    pub fn free_space(&self, registry: &[Jig]) -> i64 {
        self.capacity as i64 - self.used_space(registry) as i64
    }
}

/// Ordered schedule of jig ids; the head is the next demanded jig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionLine {
    pub schedule: Vec<JigId>,
}

impl ProductionLine {
    pub fn new(schedule: Vec<JigId>) -> Self {
        Self { schedule }
    }

    pub fn head(&self) -> Option<JigId> {
        self.schedule.first().copied()
    }
}

/// Cargo aircraft: incoming cargo and outgoing demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beluga {
    /// Jigs still aboard; unloaded from the back.
    pub incoming: Vec<JigId>,
    /// Demanded jig types, served front-first.
    pub outgoing: Vec<JigTypeId>,
}

impl Beluga {
    pub fn new(incoming: Vec<JigId>, outgoing: Vec<JigTypeId>) -> Self {
        Self { incoming, outgoing }
    }

    /// A beluga with nothing aboard and nothing demanded is done and
    /// gets removed from the snapshot.
    pub fn is_complete(&self) -> bool {
        self.incoming.is_empty() && self.outgoing.is_empty()
    }
}

/// Weighted subgoal components of the evaluation score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubgoalScores {
    pub unloads: f32,
    pub belugas_finished: f32,
    pub lines_finished: f32,
    pub solved: f32,
}

impl SubgoalScores {
    pub fn total(&self) -> f32 {
        self.unloads + self.belugas_finished + self.lines_finished + self.solved
    }
}

/// Complete snapshot of the problem.
///
/// Logically immutable from the search's perspective: `clone()` yields an
/// independent value, and the transition engine only mutates the snapshot
/// it is called on. Only `belugas[0]` is ever active.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemState {
    pub jigs: Vec<Jig>,
    pub belugas: Vec<Beluga>,
    pub trailers_beluga: Vec<Option<JigId>>,
    pub trailers_factory: Vec<Option<JigId>>,
    pub racks: Vec<Rack>,
    pub production_lines: Vec<ProductionLine>,
    pub hangars: Vec<Option<JigId>>,

    /// Times a beluga became empty of cargo.
    pub belugas_unloaded: u32,
    pub belugas_finished: u32,
    pub production_lines_finished: u32,
    pub total_belugas: u32,
    pub total_lines: u32,
}

impl ProblemState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        jigs: Vec<Jig>,
        belugas: Vec<Beluga>,
        trailers_beluga: Vec<Option<JigId>>,
        trailers_factory: Vec<Option<JigId>>,
        racks: Vec<Rack>,
        production_lines: Vec<ProductionLine>,
        hangars: Vec<Option<JigId>>,
    ) -> Self {
        let total_belugas = belugas.len() as u32;
        let total_lines = production_lines.len() as u32;
        Self {
            jigs,
            belugas,
            trailers_beluga,
            trailers_factory,
            racks,
            production_lines,
            hangars,
            belugas_unloaded: 0,
            belugas_finished: 0,
            production_lines_finished: 0,
            total_belugas,
            total_lines,
        }
    }

    /// The active beluga, if any.
    pub fn active_beluga(&self) -> Option<&Beluga> {
        self.belugas.first()
    }

    /// True iff all belugas and all production lines are finished.
    pub fn is_terminal(&self) -> bool {
        self.belugas.is_empty() && self.production_lines.is_empty()
    }

    /// Derived goal flag; equivalent to [`ProblemState::is_terminal`].
    pub fn problem_solved(&self) -> bool {
        self.is_terminal()
    }

    /// Weighted subgoal breakdown.
    ///
    /// Finished counts are derived from current vs. initial sequence sizes;
    /// only the unload counter is tracked explicitly.
    pub fn subgoal_scores(&self) -> SubgoalScores {
        let belugas_finished = self.total_belugas - self.belugas.len() as u32;
        let lines_finished = self.total_lines - self.production_lines.len() as u32;
        SubgoalScores {
            unloads: self.belugas_unloaded as f32 * 15.0,
            belugas_finished: belugas_finished as f32 * 60.0,
            lines_finished: lines_finished as f32 * 100.0,
            solved: if self.problem_solved() { 1000.0 } else { 0.0 },
        }
    }

    /// Reward of this snapshot at `depth` actions from the search root,
    /// with the default depth penalty.
    pub fn evaluate(&self, depth: u32) -> f32 {
        self.evaluate_with_mu(depth, DEFAULT_MU)
    }

    pub fn evaluate_with_mu(&self, depth: u32, mu: f32) -> f32 {
        self.subgoal_scores().total() - mu * depth as f32
    }
}

fn write_slots(f: &mut fmt::Formatter<'_>, slots: &[Option<JigId>]) -> fmt::Result {
    write!(f, "[")?;
    for (i, slot) in slots.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match slot {
            Some(id) => write!(f, "{id}")?,
            None => write!(f, "-")?,
        }
    }
    write!(f, "]")
}

impl fmt::Display for ProblemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "jigs:")?;
        for (i, jig) in self.jigs.iter().enumerate() {
            writeln!(f, "\t{i}: {} | {}", jig.type_id, jig.empty)?;
        }
        writeln!(f, "belugas:")?;
        for (i, b) in self.belugas.iter().enumerate() {
            let outgoing: Vec<&str> = b.outgoing.iter().map(|t| t.name()).collect();
            writeln!(
                f,
                "\t{i}: incoming = {:?} | outgoing = {:?}",
                b.incoming, outgoing
            )?;
        }
        write!(f, "trailers_beluga: ")?;
        write_slots(f, &self.trailers_beluga)?;
        writeln!(f)?;
        write!(f, "trailers_factory: ")?;
        write_slots(f, &self.trailers_factory)?;
        writeln!(f)?;
        writeln!(f, "racks:")?;
        for (i, r) in self.racks.iter().enumerate() {
            writeln!(f, "\t{i}: capacity = {} | jigs = {:?}", r.capacity, r.jigs)?;
        }
        writeln!(f, "production_lines:")?;
        for (i, pl) in self.production_lines.iter().enumerate() {
            writeln!(f, "\t{i}: schedule = {:?}", pl.schedule)?;
        }
        write!(f, "hangars: ")?;
        write_slots(f, &self.hangars)
    }
}

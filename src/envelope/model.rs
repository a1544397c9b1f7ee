use crate::{
    envelope::{
        interp::{BorderMode, evaluate_with},
        mapping::ValueMapping,
        node::Breakpoint,
    },
    foundation::error::{CdpError, CdpResult},
};

/// An ordered, editable collection of breakpoints.
///
/// Nodes are kept sorted by time (stable, so equal times keep insertion order). Every
/// mutation re-sorts immediately unless a batch is open; [`Envelope::end_batch`] sorts once.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(from = "EnvelopeDef")]
pub struct Envelope {
    pub name: String,
    nodes: Vec<Breakpoint>,
    #[serde(default = "default_value")]
    pub default_value: f64,
    #[serde(default)]
    pub min_value: f64,
    #[serde(default = "one")]
    pub max_value: f64,
    /// Normalized-to-scaled conversion (identity unless set).
    #[serde(default)]
    pub mapping: ValueMapping,
    #[serde(default)]
    pub border: BorderMode,
    #[serde(default = "default_grid")]
    value_grid: Vec<f64>,
    #[serde(default)]
    reset_nodes: Vec<Breakpoint>,

    #[serde(skip)]
    in_batch: bool,
    #[serde(skip)]
    snapshot: Option<Vec<Breakpoint>>,
}

fn default_value() -> f64 {
    0.5
}

fn one() -> f64 {
    1.0
}

fn default_grid() -> Vec<f64> {
    vec![0.0, 0.25, 0.5, 0.75, 1.0]
}

/// Deserialized form; converted into a sorted [`Envelope`].
#[derive(serde::Deserialize)]
struct EnvelopeDef {
    #[serde(default)]
    name: String,
    #[serde(default)]
    nodes: Vec<Breakpoint>,
    #[serde(default = "default_value")]
    default_value: f64,
    #[serde(default)]
    min_value: f64,
    #[serde(default = "one")]
    max_value: f64,
    #[serde(default)]
    mapping: ValueMapping,
    #[serde(default)]
    border: BorderMode,
    #[serde(default = "default_grid")]
    value_grid: Vec<f64>,
    #[serde(default)]
    reset_nodes: Vec<Breakpoint>,
}

impl From<EnvelopeDef> for Envelope {
    fn from(def: EnvelopeDef) -> Self {
        let mut env = Self::new(def.name, def.min_value, def.max_value);
        env.nodes = def.nodes;
        env.default_value = def.default_value;
        env.mapping = def.mapping;
        env.border = def.border;
        env.set_value_grid(def.value_grid);
        env.reset_nodes = def.reset_nodes;
        env.sort();
        env
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new("envelope", 0.0, 1.0)
    }
}

impl Envelope {
    pub fn new(name: impl Into<String>, min_value: f64, max_value: f64) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            default_value: default_value(),
            min_value,
            max_value,
            mapping: ValueMapping::Identity,
            border: BorderMode::Clamp,
            value_grid: default_grid(),
            reset_nodes: Vec::new(),
            in_batch: false,
            snapshot: None,
        }
    }

    /// Build an envelope from nodes in any order.
    pub fn from_nodes(name: impl Into<String>, nodes: Vec<Breakpoint>) -> Self {
        let mut env = Self::new(name, 0.0, 1.0);
        env.nodes = nodes;
        env.sort();
        env
    }

    pub fn nodes(&self) -> &[Breakpoint] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_batching(&self) -> bool {
        self.in_batch
    }

    fn sort_unless_batching(&mut self) {
        if !self.in_batch {
            self.sort();
        }
    }

    fn clamp_index(&self, index: usize) -> CdpResult<usize> {
        if self.nodes.is_empty() {
            return Err(CdpError::envelope(format!(
                "empty envelope '{}' accessed",
                self.name
            )));
        }
        Ok(index.min(self.nodes.len() - 1))
    }

    pub fn add_node(&mut self, node: Breakpoint) {
        self.nodes.push(node);
        self.sort_unless_batching();
    }

    /// Remove the node at `index` (clamped to the last node). No-op on an empty envelope.
    pub fn delete_node(&mut self, index: usize) {
        if self.nodes.is_empty() {
            return;
        }
        let index = index.min(self.nodes.len() - 1);
        self.nodes.remove(index);
    }

    /// Remove every node with `t0 <= time <= t1`, keeping survivors in order.
    pub fn delete_nodes_in_range(&mut self, t0: f64, t1: f64) {
        self.nodes.retain(|n| !(n.time >= t0 && n.time <= t1));
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Node at `index`, clamped into range. Fails on an empty envelope.
    pub fn node(&self, index: usize) -> CdpResult<&Breakpoint> {
        let index = self.clamp_index(index)?;
        Ok(&self.nodes[index])
    }

    /// Replace the node at `index` (clamped). Fails on an empty envelope.
    pub fn set_node(&mut self, index: usize, node: Breakpoint) -> CdpResult<()> {
        let index = self.clamp_index(index)?;
        self.nodes[index] = node;
        self.sort_unless_batching();
        Ok(())
    }

    pub fn set_node_time_value(
        &mut self,
        index: usize,
        time: Option<f64>,
        value: Option<f64>,
    ) -> CdpResult<()> {
        let index = self.clamp_index(index)?;
        let node = &mut self.nodes[index];
        if let Some(t) = time {
            node.time = t;
        }
        if let Some(v) = value {
            node.value = v;
        }
        self.sort_unless_batching();
        Ok(())
    }

    pub fn set_node_status(&mut self, index: usize, status: i32) -> CdpResult<()> {
        let index = self.clamp_index(index)?;
        self.nodes[index].status = status;
        Ok(())
    }

    /// Stable sort by time.
    pub fn sort(&mut self) {
        self.nodes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    pub fn is_sorted(&self) -> bool {
        self.nodes.is_sorted_by(|a, b| a.time <= b.time)
    }

    /// Defer sorting until [`Envelope::end_batch`].
    pub fn begin_batch(&mut self) {
        self.in_batch = true;
    }

    pub fn end_batch(&mut self) {
        self.in_batch = false;
        self.sort();
    }

    /// Run `f` inside a batch; the envelope is sorted once afterwards.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_batch();
        let out = f(self);
        self.end_batch();
        out
    }

    /// Keep a copy of the current nodes for a later [`Envelope::restore`].
    pub fn snapshot(&mut self) {
        self.snapshot = Some(self.nodes.clone());
    }

    /// Nodes captured by the last [`Envelope::snapshot`], if any.
    pub fn snapshot_nodes(&self) -> Option<&[Breakpoint]> {
        self.snapshot.as_deref()
    }

    /// Roll back to the snapshot. Returns false when there is none.
    pub fn restore(&mut self) -> bool {
        match self.snapshot.take() {
            Some(nodes) => {
                self.nodes = nodes;
                true
            }
            None => false,
        }
    }

    /// Drop the snapshot, keeping the current nodes.
    pub fn discard_snapshot(&mut self) {
        self.snapshot = None;
    }

    /// Edit a copy of the nodes; the copy replaces the nodes (and is sorted) only if `f`
    /// returns true.
    pub fn manipulate(&mut self, f: impl FnOnce(&mut Vec<Breakpoint>) -> bool) -> bool {
        let mut working = self.nodes.clone();
        if !f(&mut working) {
            return false;
        }
        self.nodes = working;
        self.sort();
        true
    }

    /// Normalized value at `t`.
    pub fn interpolated_value(&self, t: f64) -> f64 {
        evaluate_with(&self.nodes, t, self.default_value, self.border)
    }

    /// Value at `t` passed through the envelope's mapping.
    pub fn scaled_value(&self, t: f64) -> f64 {
        self.mapping.to_scaled(self.interpolated_value(t))
    }

    /// Store the nodes that [`Envelope::reset`] returns to.
    pub fn set_reset_nodes(&mut self, nodes: Vec<Breakpoint>) {
        self.reset_nodes = nodes;
    }

    /// Replace the current nodes with `nodes` given in scaled units.
    pub fn set_nodes_from_scaled(&mut self, nodes: &[Breakpoint]) {
        self.nodes = nodes
            .iter()
            .map(|n| Breakpoint {
                value: self.mapping.to_normalized(n.value),
                ..*n
            })
            .collect();
        self.sort();
    }

    pub fn reset(&mut self) {
        self.nodes = self.reset_nodes.clone();
        self.sort();
    }

    /// Nodes within `[offset, offset + 1]`, re-based so `offset` becomes time zero.
    pub fn repeater_nodes(&self, offset: f64) -> Vec<Breakpoint> {
        self.nodes
            .iter()
            .filter(|n| n.time >= offset && n.time <= offset + 1.0)
            .map(|n| Breakpoint {
                time: n.time - offset,
                ..*n
            })
            .collect()
    }

    pub fn value_grid(&self) -> &[f64] {
        &self.value_grid
    }

    pub fn set_value_grid(&mut self, mut grid: Vec<f64>) {
        grid.sort_by(f64::total_cmp);
        self.value_grid = grid;
    }

    /// Pull `x` toward the nearest grid line by `amount` (0 = untouched, 1 = snapped).
    pub fn quantize_to_grid(&self, x: f64, amount: f64) -> f64 {
        let grid = &self.value_grid;
        let Some(&last) = grid.last() else {
            return x;
        };
        let idx = grid.partition_point(|&g| g < x);
        if idx >= grid.len() {
            return x + (last - x) * amount;
        }
        let upper = grid[idx];
        let lower = grid[idx.saturating_sub(1)];
        let target = if (lower - x).abs() < (upper - x).abs() {
            lower
        } else {
            upper
        };
        x + amount * (target - x)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/envelope/model.rs"]
mod tests;

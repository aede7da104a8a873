//! Layer layouts and the per-timestep stack runner shared by containers.

use burn::nn::Dropout;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::cells::{LstmState, RecurrentCell};

/// One entry of a container's stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Cell,
    Dropout,
    Attention,
}

/// Where dropout layers sit relative to the cells of a stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropoutPlacement {
    /// Between consecutive cells, never before the first
    #[default]
    Between,
    /// Before every cell
    Before,
    /// After every cell
    After,
}

/// Ordered description of a container's stack.
///
/// Cells and dropouts are stored in separate vectors on the container; the
/// layout records how they interleave.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerLayout {
    kinds: Vec<LayerKind>,
}

impl LayerLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Cell, (Dropout, Cell) × (cells - 1)`
    pub fn interleaved(cells: usize) -> Self {
        let mut layout = Self::new();
        for i in 0..cells {
            if i > 0 {
                layout = layout.push(LayerKind::Dropout);
            }
            layout = layout.push(LayerKind::Cell);
        }
        layout
    }

    /// `(Cell, Dropout) × cells`
    pub fn cell_then_dropout(cells: usize) -> Self {
        (0..cells).fold(Self::new(), |layout, _| {
            layout.push(LayerKind::Cell).push(LayerKind::Dropout)
        })
    }

    /// `(Dropout, Cell) × cells`
    pub fn dropout_then_cell(cells: usize) -> Self {
        (0..cells).fold(Self::new(), |layout, _| {
            layout.push(LayerKind::Dropout).push(LayerKind::Cell)
        })
    }

    pub fn with_placement(placement: DropoutPlacement, cells: usize) -> Self {
        match placement {
            DropoutPlacement::Between => Self::interleaved(cells),
            DropoutPlacement::Before => Self::dropout_then_cell(cells),
            DropoutPlacement::After => Self::cell_then_dropout(cells),
        }
    }

    pub fn push(mut self, kind: LayerKind) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn extend(mut self, other: &LayerLayout) -> Self {
        self.kinds.extend_from_slice(&other.kinds);
        self
    }

    pub fn kinds(&self) -> &[LayerKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn count(&self, kind: LayerKind) -> usize {
        self.kinds.iter().filter(|k| **k == kind).count()
    }

    pub fn cell_count(&self) -> usize {
        self.count(LayerKind::Cell)
    }

    pub fn dropout_count(&self) -> usize {
        self.count(LayerKind::Dropout)
    }
}

/// Recurrent state of every cell in a stack.
///
/// With `state_sync` the stack shares one state: each cell starts from the
/// state the cell below it produced during the same timestep.
#[derive(Clone, Debug)]
pub struct StackState<B: Backend> {
    states: Vec<LstmState<B>>,
    synced: bool,
}

impl<B: Backend> StackState<B> {
    /// Zero state for `cells`, optionally seeding the shared state (or the
    /// lowest cell's state when not synced) with `initial`.
    pub fn init<C: RecurrentCell<B>>(
        cells: &[C],
        synced: bool,
        batch_size: usize,
        initial: Option<LstmState<B>>,
        device: &B::Device,
    ) -> Self {
        let slots = if synced {
            cells.len().min(1)
        } else {
            cells.len()
        };
        let mut states: Vec<LstmState<B>> = cells
            .iter()
            .take(slots)
            .map(|cell| LstmState::zeros(batch_size, cell.hidden_size(), device))
            .collect();

        if let (Some(initial), Some(first)) = (initial, states.first_mut()) {
            *first = initial;
        }

        Self { states, synced }
    }

    fn slot(&self, cell_index: usize) -> usize {
        if self.synced {
            0
        } else {
            cell_index
        }
    }

    /// State of the topmost cell
    pub fn last(&self) -> Option<&LstmState<B>> {
        self.states.last()
    }

    pub fn into_states(self) -> Vec<LstmState<B>> {
        self.states
    }
}

/// Push one timestep through the cell/dropout entries of `kinds`.
///
/// Entries other than cells and dropouts are skipped; containers that own
/// such layers run them before calling this.
pub fn run_stack<B: Backend, C: RecurrentCell<B>>(
    kinds: &[LayerKind],
    cells: &[C],
    dropouts: &[Dropout],
    input: Tensor<B, 2>,
    state: &mut StackState<B>,
) -> Tensor<B, 2> {
    let mut x = input;
    let mut cell_index = 0;
    let mut dropout_index = 0;

    for kind in kinds {
        match kind {
            LayerKind::Dropout => {
                x = dropouts[dropout_index].forward(x);
                dropout_index += 1;
            }
            LayerKind::Cell => {
                let slot = state.slot(cell_index);
                let (output, next) = cells[cell_index].step(x, state.states[slot].clone());
                state.states[slot] = next;
                x = output;
                cell_index += 1;
            }
            LayerKind::Attention => {}
        }
    }

    x
}

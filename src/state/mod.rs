use self::process::Process;
use uuid::Uuid;

pub mod process;

/// Process records plus the z-order of the visible ones and the focus.
pub struct ProcessTable {
    processes: Vec<Process>,
    z_order: Vec<usize>, // Visible process ids, back to front
    focus: Option<usize>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            z_order: Vec::new(),
            focus: None,
        }
    }

    /// Append a process; a visible one goes on top of the z-order.
    /// Returns its id.
    pub fn insert(&mut self, process: Process) -> usize {
        let id = self.processes.len();
        let visible = process.visible;
        self.processes.push(process);
        if visible {
            self.z_order.push(id);
        }
        id
    }

    /// Remove a process and shift every id above it down by one in the
    /// z-order and the focus.
    pub fn remove(&mut self, id: usize) -> Option<Process> {
        if id >= self.processes.len() {
            return None;
        }
        let removed = self.processes.remove(id);

        self.z_order.retain(|&z| z != id);
        for z in self.z_order.iter_mut() {
            if *z > id {
                *z -= 1;
            }
        }

        self.focus = match self.focus {
            Some(f) if f == id => None,
            Some(f) if f > id => Some(f - 1),
            other => other,
        };

        Some(removed)
    }

    pub fn get(&self, id: usize) -> Option<&Process> {
        self.processes.get(id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Process> {
        self.processes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Process> {
        self.processes.iter_mut()
    }

    /// Current id of the process with this handle.
    pub fn index_of(&self, handle: Uuid) -> Option<usize> {
        self.processes.iter().position(|p| p.handle == handle)
    }

    pub fn z_order(&self) -> &[usize] {
        &self.z_order
    }

    pub fn is_topmost(&self, id: usize) -> bool {
        self.z_order.last() == Some(&id)
    }

    /// Ids stacked above `id`, in paint order. Empty when `id` is not stacked.
    pub fn above(&self, id: usize) -> Vec<usize> {
        match self.z_order.iter().position(|&z| z == id) {
            Some(pos) => self.z_order[pos + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    /// Show a process and put it on top of the z-order.
    pub fn raise(&mut self, id: usize) {
        let Some(process) = self.processes.get_mut(id) else {
            return;
        };
        process.visible = true;
        process.surface.set_visible(true);
        self.z_order.retain(|&z| z != id);
        self.z_order.push(id);
    }

    /// Hide a process and take it out of the z-order.
    pub fn hide(&mut self, id: usize) {
        let Some(process) = self.processes.get_mut(id) else {
            return;
        };
        process.visible = false;
        process.surface.set_visible(false);
        self.z_order.retain(|&z| z != id);
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Set the focus; ids that do not name a live process clear it.
    pub fn set_focus(&mut self, id: Option<usize>) {
        self.focus = id.filter(|&i| self.processes.get(i).is_some_and(|p| p.alive));
    }

    /// Topmost visible process whose window contains the cell. Windows are
    /// opaque: the first hit wins.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<usize> {
        self.z_order.iter().rev().copied().find(|&id| {
            self.processes
                .get(id)
                .is_some_and(|p| p.visible && p.geometry.contains(x, y))
        })
    }

    /// Check the structural invariants. Used by tests.
    pub fn check_invariants(&self) -> Result<(), String> {
        for &id in &self.z_order {
            let p = self
                .processes
                .get(id)
                .ok_or_else(|| format!("z-order id {} has no process", id))?;
            if !p.alive || !p.visible {
                return Err(format!("z-order id {} is not live and visible", id));
            }
        }
        for (id, p) in self.processes.iter().enumerate() {
            let count = self.z_order.iter().filter(|&&z| z == id).count();
            if p.alive && p.visible && count != 1 {
                return Err(format!("process {} appears {} times in z-order", id, count));
            }
        }
        if let Some(f) = self.focus {
            if !self.processes.get(f).is_some_and(|p| p.alive) {
                return Err(format!("focus {} is not a live process", f));
            }
        }
        Ok(())
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

//! Exclusión mutua por proyecto.
//!
//! Todas las mutaciones de artifacts y ejecuciones de stage de un mismo
//! proyecto se serializan tomando el mismo candado; proyectos distintos no se
//! bloquean entre sí. El candado no es reentrante: las operaciones que ya lo
//! tienen reciben el `ProjectGuard` en lugar de volver a pedirlo.

use std::collections::HashSet;

use log::debug;
use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct ProjectLocks {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bloquea hasta obtener el candado de `project_id`.
    pub fn lock(&self, project_id: &str) -> ProjectGuard<'_> {
        let mut held = self.held.lock();
        while held.contains(project_id) {
            debug!("waiting for project lock '{}'", project_id);
            self.released.wait(&mut held);
        }
        held.insert(project_id.to_string());
        ProjectGuard { locks: self,
                       project_id: project_id.to_string() }
    }
}

/// Prueba de posesión del candado de un proyecto. Se libera al soltarse.
#[derive(Debug)]
pub struct ProjectGuard<'a> {
    locks: &'a ProjectLocks,
    project_id: String,
}

impl ProjectGuard<'_> {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub(crate) fn belongs_to(&self, locks: &ProjectLocks) -> bool {
        std::ptr::eq(self.locks, locks)
    }
}

impl Drop for ProjectGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock();
        held.remove(&self.project_id);
        self.locks.released.notify_all();
    }
}

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::{Halt, Step, TraversalState, Visit, Walker};
use crate::entry::Entry;
use crate::error::WalkError;
use crate::options::{Roots, WalkOptions};
use crate::results::Results;

/// Walk every root in turn on the calling thread.
pub(crate) fn run(roots: Roots, opts: &WalkOptions) -> Result<Results, WalkError> {
    roots.validate()?;
    let start = Instant::now();
    let state = Arc::new(TraversalState::new(opts.unique));
    debug!(roots = roots.paths().len(), multi = roots.is_multi(), "starting blocking walk");

    for root in roots.paths() {
        let walker = match Walker::new(opts.clone(), root, Arc::clone(&state)) {
            Ok(w) => w,
            Err(e) => {
                state.latch(e);
                break;
            }
        };
        if walk_dir(&walker, &walker.root_entry()).is_err() {
            break;
        }
    }

    state.finish(start.elapsed())
}

fn walk_dir(walker: &Walker, dir: &Entry) -> Step {
    if walker.halted() {
        return Err(Halt);
    }

    let raws = match walker.list(dir.path(), dir.is_root()) {
        Ok(raws) => raws,
        Err(e) => return walker.recover(e),
    };

    for raw in raws {
        let mut child = walker.child(dir, raw);

        if let Err(e) = walker.decorate(&mut child) {
            walker.recover(e)?;
            continue;
        }

        match walker.resolve_link(&mut child) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                walker.recover(e)?;
                continue;
            }
        }

        match walker.classify(&child) {
            Visit::Skip => {}
            Visit::Dir => match walker.visit_dir(&mut child) {
                Ok(true) => walk_dir(walker, &child)?,
                Ok(false) => {}
                Err(e) => walker.recover(e)?,
            },
            Visit::File => {
                if let Err(e) = walker.visit_file(&mut child) {
                    walker.recover(e)?;
                }
            }
        }
    }

    Ok(())
}

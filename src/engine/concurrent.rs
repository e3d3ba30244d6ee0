use std::sync::Arc;
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt};
use tokio::task::JoinSet;
use tracing::debug;

use super::{Halt, Step, TraversalState, Visit, Walker};
use crate::entry::Entry;
use crate::error::WalkError;
use crate::options::{Roots, WalkOptions};
use crate::results::Results;

/// Walk every root concurrently into one shared result set.
///
/// Resolves once all roots are drained. The first fatal error wins; roots
/// still running when it is latched finish without adding results.
pub(crate) async fn run(roots: Roots, opts: &WalkOptions) -> Result<Results, WalkError> {
    roots.validate()?;
    let start = Instant::now();
    let state = Arc::new(TraversalState::new(opts.unique));
    debug!(roots = roots.paths().len(), multi = roots.is_multi(), "starting async walk");

    let mut tasks = JoinSet::new();
    for root in roots.paths().iter().cloned() {
        let opts = opts.clone();
        let state = Arc::clone(&state);
        tasks.spawn(async move {
            let resolved = {
                let state = Arc::clone(&state);
                blocking(move || Walker::new(opts, &root, state)).await
            };
            match resolved {
                Ok(walker) => {
                    let walker = Arc::new(walker);
                    let root = walker.root_entry();
                    walk_dir(walker, root).await
                }
                Err(e) => {
                    state.latch(e);
                    Err(Halt)
                }
            }
        });
    }
    // a halted root has already latched its error into `state`
    let _ = drain(&mut tasks, &state).await;

    state.finish(start.elapsed())
}

/// Walk one directory. Child directories are spawned as their own tasks,
/// so sibling subtrees proceed concurrently; this future completes only
/// after every one of them has.
fn walk_dir(walker: Arc<Walker>, dir: Entry) -> BoxFuture<'static, Step> {
    async move {
        if walker.halted() {
            return Err(Halt);
        }

        let listing = {
            let w = Arc::clone(&walker);
            let path = dir.path().to_path_buf();
            let root = dir.is_root();
            blocking(move || w.list(&path, root)).await
        };
        let raws = match listing {
            Ok(raws) => raws,
            Err(e) => return walker.recover(e),
        };

        let mut tasks = JoinSet::new();
        let mut outcome = Ok(());

        for raw in raws {
            if walker.halted() {
                outcome = Err(Halt);
                break;
            }

            let mut child = walker.child(&dir, raw);

            if let Err(e) = walker.decorate(&mut child) {
                if walker.recover(e).is_err() {
                    outcome = Err(Halt);
                    break;
                }
                continue;
            }

            if child.is_symlink() {
                let w = Arc::clone(&walker);
                let resolved = blocking(move || {
                    let alive = w.resolve_link(&mut child)?;
                    Ok((child, alive))
                })
                .await;
                match resolved {
                    Ok((resolved, true)) => child = resolved,
                    Ok((_, false)) => continue,
                    Err(e) => {
                        if walker.recover(e).is_err() {
                            outcome = Err(Halt);
                            break;
                        }
                        continue;
                    }
                }
            }

            let visit = walker.classify(&child);
            let failed = match visit {
                Visit::Skip => None,
                Visit::Dir => match walker.visit_dir(&mut child) {
                    Ok(true) => {
                        tasks.spawn(walk_dir(Arc::clone(&walker), child));
                        None
                    }
                    Ok(false) => None,
                    Err(e) => Some(e),
                },
                Visit::File => walker.visit_file(&mut child).err(),
            };
            if let Some(e) = failed {
                if walker.recover(e).is_err() {
                    outcome = Err(Halt);
                    break;
                }
            }
        }

        if drain(&mut tasks, &walker.state).await.is_err() {
            outcome = Err(Halt);
        }
        outcome
    }
    .boxed()
}

/// Wait for every task, even after a failure, so no subtree outlives the
/// walk that started it.
async fn drain(tasks: &mut JoinSet<Step>, state: &TraversalState) -> Step {
    let mut outcome = Ok(());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(Halt)) => outcome = Err(Halt),
            Err(e) => {
                state.latch(WalkError::Runtime(e.to_string()));
                outcome = Err(Halt);
            }
        }
    }
    outcome
}

/// Run a filesystem step on tokio's blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, WalkError>
where
    F: FnOnce() -> Result<T, WalkError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WalkError::Runtime(e.to_string()))?
}

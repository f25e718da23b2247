use std::cell::Cell;
use std::rc::Rc;

use dioxus::prelude::*;

use crate::chain::randomness::block_randomness;
use crate::chain::submit::record_spin_on_chain;
use crate::data::{custom_project_id, Project};
use crate::session::{apply_spin, SpinOutcome};
use crate::storage;
use crate::time::{now_ms, sleep_ms};
use crate::{ChainManager, RouletteState};

/// Cosmetic delay so the wheel is seen spinning even when the seed arrives
/// instantly.
const SPIN_ANIMATION_MS: u32 = 2_000;

#[derive(Clone)]
pub struct UseRoulette {
    pub state: Signal<RouletteState>,
    manager: ChainManager,
}

pub fn use_roulette() -> UseRoulette {
    let mut state = use_context::<Signal<RouletteState>>();
    let manager = use_context::<ChainManager>();

    // Restore the persisted session once, then resume the countdown if the
    // page was reloaded mid-cooldown.
    let restored = use_hook(|| Rc::new(Cell::new(false)));
    use_effect(move || {
        if !restored.get() {
            restored.set(true);

            let session = storage::load_session();
            let now = now_ms();
            {
                let mut r = state.write();
                r.all_discovered =
                    session.discovered.len() >= r.effective_catalog().len();
                r.can_spin = session.can_spin(now) && !r.all_discovered;
                r.cooldown_remaining = session.cooldown_remaining_secs(now);
                r.session = session;
            }
            if !state.read().can_spin && !state.read().all_discovered {
                start_cooldown_tick(state);
            }
        }
    });

    UseRoulette { state, manager }
}

impl UseRoulette {
    /// Run one spin for `address`. Rejected synchronously while a spin is in
    /// flight or the cooldown is active; otherwise the async work is spawned
    /// and state is updated as it lands.
    pub fn spin(&self, address: String) {
        let mut state = self.state;
        let manager = self.manager.clone();

        if state.read().is_spinning {
            return;
        }
        let now = now_ms();
        {
            let r = state.read();
            if !r.session.can_spin(now) {
                let wait = r.session.wait_secs(now);
                drop(r);
                state
                    .write()
                    .set_error(format!("Please wait {wait} seconds before spinning again"));
                return;
            }
            if r.all_discovered {
                drop(r);
                state
                    .write()
                    .set_error("You have discovered every project! Reset to spin again");
                return;
            }
        }

        {
            let mut r = state.write();
            r.is_spinning = true;
            r.error = None;
            r.advisory = None;
            r.last_tx_hash = None;
        }

        spawn(async move {
            let seed = block_randomness(&manager).await;
            sleep_ms(SPIN_ANIMATION_MS).await;

            let catalog = state.read().effective_catalog();
            let generation = state.read().spin_generation;
            let outcome = {
                let mut r = state.write();
                let outcome = apply_spin(&mut r.session, &catalog, seed, now_ms());
                r.is_spinning = false;
                outcome
            };

            match outcome {
                SpinOutcome::Exhausted => {
                    let mut r = state.write();
                    r.all_discovered = true;
                    r.can_spin = false;
                    r.set_error("You have discovered every project! Reset to spin again");
                }
                SpinOutcome::Discovered(project) => {
                    {
                        let mut r = state.write();
                        storage::save_session(&r.session);
                        r.all_discovered =
                            r.session.discovered.len() >= catalog.len();
                        r.can_spin = false;
                        r.cooldown_remaining =
                            r.session.cooldown_remaining_secs(now_ms());
                        r.current = Some(project.clone());
                    }
                    start_cooldown_tick(state);

                    // On-chain recording runs detached; the spin result never
                    // waits on it.
                    spawn(async move {
                        let outcome =
                            record_spin_on_chain(&manager, &address, &project.id, seed)
                                .await
                                .map_err(|e| {
                                    tracing::warn!("on-chain recording failed: {}", e);
                                    e.to_string()
                                });
                        state.write().apply_recording_outcome(generation, outcome);
                    });
                }
            }
        });
    }

    /// Wipe the session and start over. In-flight recording tasks from the
    /// old session are invalidated by the generation bump.
    pub fn reset(&self) {
        let mut state = self.state;
        let mut r = state.write();
        r.session.reset();
        storage::save_session(&r.session);
        r.current = None;
        r.is_spinning = false;
        r.can_spin = true;
        r.cooldown_remaining = 0;
        r.all_discovered = false;
        r.error = None;
        r.advisory = None;
        r.last_tx_hash = None;
        r.spin_generation += 1;
    }

    /// Add a user-defined project to the spinnable catalog.
    pub fn add_project(&self, project: Project) -> Result<(), String> {
        let mut state = self.state;
        let duplicate = state
            .read()
            .effective_catalog()
            .iter()
            .any(|p| p.id == project.id);
        if duplicate {
            return Err(format!("A project with id {} already exists", project.id));
        }
        let mut r = state.write();
        r.custom_projects.push(project);
        // A full board opens back up when the catalog grows.
        if r.all_discovered {
            r.all_discovered = false;
            r.can_spin = r.session.can_spin(now_ms());
        }
        Ok(())
    }

    pub fn custom_id(&self) -> String {
        custom_project_id(now_ms())
    }

    pub fn clear_error(&self) {
        let mut state = self.state;
        state.write().error = None;
    }
}

/// Tick the countdown once a second until the cooldown expires. Each spin
/// starts its own tick; the loop exits as soon as spinning is allowed again.
fn start_cooldown_tick(mut state: Signal<RouletteState>) {
    spawn(async move {
        loop {
            sleep_ms(1_000).await;
            let now = now_ms();
            let mut r = state.write();
            if r.all_discovered {
                break;
            }
            if r.session.can_spin(now) {
                r.can_spin = true;
                r.cooldown_remaining = 0;
                break;
            }
            r.cooldown_remaining = r.session.cooldown_remaining_secs(now);
        }
    });
}

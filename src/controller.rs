use crossbeam_channel::{bounded, unbounded, Receiver, SendTimeoutError, Sender, TrySendError};
use log::{debug, info, warn};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::animation::Clock;
use crate::config::{ParticlizeConfig, RuntimeConfig};
use crate::particle::{ParticleEffect, ParticleFrame};
use crate::particle_system::ParticleSystem;
use crate::pixel_buffer::PixelBuffer;

/// Attente maximale pour livrer un événement de cycle de vie à un hôte saturé.
const LIFECYCLE_EVENT_TIMEOUT: Duration = Duration::from_secs(1);

/// Callback appelé une seule fois quand l'effet est terminé.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    /// Capture du contenu demandée à l'hôte
    Capturing,
    /// Boucle de frames en cours
    Running,
    Destroyed,
}

/// Notifications vers l'hôte (capture, rendu, fin).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// L'hôte doit capturer son contenu puis appeler `on_content_captured`
    CaptureRequested,
    Started { particles: usize },
    /// Une nouvelle frame est disponible via `latest_frame()`
    Redraw { frame: u64 },
    Completed,
    CaptureTimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopCommand {
    Pause,
    Resume,
}

/// Paramètres retenus entre `start` et la livraison de la capture.
struct PendingRun {
    effect: ParticleEffect,
    config: ParticlizeConfig,
    on_complete: CompletionCallback,
    requested_at_ms: u64,
}

#[derive(Default)]
struct Shared {
    state: ControllerState,
    pending: Option<PendingRun>,
    on_complete: Option<CompletionCallback>,
    latest: Option<Arc<ParticleFrame>>,
    completion: f32,
}

/// 🎬 Contrôleur d'effet
///
/// Machine à états `Idle → Capturing → Running → Destroyed` pilotant un
/// [`ParticleSystem`] sur un thread dédié :
///
/// - `start` demande une capture à l'hôte (événement `CaptureRequested`) ;
/// - `on_content_captured` génère les particules et lance la boucle de frames ;
/// - à la fin de l'animation, l'état passe à `Destroyed`, le callback est
///   appelé et la simulation est libérée ;
/// - `cleanup` arrête tout, depuis n'importe quel état, autant de fois que voulu.
///
/// Une capture jamais livrée est abandonnée après `runtime.capture_timeout_ms`
/// (retour à `Idle`, événement `CaptureTimedOut`) : un thread de surveillance
/// relit l'horloge à chaque `runtime.frame_interval_ms`.
pub struct ParticlizeController {
    clock: Arc<dyn Clock>,
    shared: Arc<Mutex<Shared>>,
    running_pair: Arc<(Mutex<bool>, Condvar)>,
    events_tx: Sender<ControllerEvent>,
    events_rx: Receiver<ControllerEvent>,
    commands: Option<Sender<LoopCommand>>,
    handle: Option<thread::JoinHandle<()>>,
    capture_watch: Mutex<Option<CaptureWatch>>,
}

impl ParticlizeController {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_event_capacity(clock, RuntimeConfig::default().event_capacity)
    }

    pub fn with_event_capacity(clock: Arc<dyn Clock>, capacity: usize) -> Self {
        let (events_tx, events_rx) = bounded(capacity.max(1));
        Self {
            clock,
            shared: Arc::new(Mutex::new(Shared::default())),
            running_pair: Arc::new((Mutex::new(false), Condvar::new())),
            events_tx,
            events_rx,
            commands: None,
            handle: None,
            capture_watch: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock_shared(&self.shared)
    }

    /// Récepteur des notifications (clonable).
    pub fn events(&self) -> Receiver<ControllerEvent> {
        self.events_rx.clone()
    }

    /// État courant ; vérifie au passage l'expiration de la capture.
    pub fn state(&self) -> ControllerState {
        self.check_capture_timeout();
        self.lock().state
    }

    /// Demande un effet. Depuis `Idle` : passe à `Capturing`. Pendant la capture :
    /// remplace les paramètres en attente. Sinon sans effet.
    pub fn start<F>(
        &self,
        effect: ParticleEffect,
        config: ParticlizeConfig,
        on_complete: F,
    ) -> anyhow::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        config.validate()?;
        self.check_capture_timeout();

        let poll = Duration::from_millis(config.runtime.frame_interval_ms);
        let mut shared = self.lock();
        let run = PendingRun {
            effect,
            config,
            on_complete: Box::new(on_complete),
            requested_at_ms: self.clock.now_ms(),
        };
        let state = shared.state;
        match state {
            ControllerState::Idle => {
                shared.state = ControllerState::Capturing;
                shared.pending = Some(run);
                drop(shared);
                info!("📸 Capture requested for {:?}", effect);
                send_event(&self.events_tx, ControllerEvent::CaptureRequested);
                self.spawn_capture_watch(poll);
            }
            ControllerState::Capturing => {
                // la capture déjà demandée reste valable, seul le délai d'origine compte
                let requested_at_ms = shared
                    .pending
                    .as_ref()
                    .map_or(run.requested_at_ms, |p| p.requested_at_ms);
                shared.pending = Some(PendingRun {
                    requested_at_ms,
                    ..run
                });
                debug!("Capture pending, effect parameters updated ({:?})", effect);
            }
            _ => debug!("start() ignored in state {:?}", state),
        }
        Ok(())
    }

    /// Abandonne une capture expirée. Retourne `true` si elle vient d'expirer.
    pub fn check_capture_timeout(&self) -> bool {
        expire_capture(&*self.clock, &self.shared, &self.events_tx)
    }

    /// Lance la surveillance de l'échéance de capture (remplace la précédente).
    fn spawn_capture_watch(&self, poll: Duration) {
        self.stop_capture_watch();

        let watching_pair = Arc::new((Mutex::new(true), Condvar::new()));
        let clock = Arc::clone(&self.clock);
        let shared = Arc::clone(&self.shared);
        let events = self.events_tx.clone();
        let pair = Arc::clone(&watching_pair);

        let spawned = thread::Builder::new()
            .name("particlize-capture-watch".into())
            .spawn(move || watch_capture(clock, shared, events, pair, poll));
        match spawned {
            Ok(handle) => {
                *self
                    .capture_watch
                    .lock()
                    .unwrap_or_else(|e| e.into_inner()) = Some(CaptureWatch {
                    watching_pair,
                    handle,
                });
            }
            // l'échéance reste vérifiée à chaque appel de l'hôte
            Err(e) => warn!("⚠️ Capture watch thread not started: {}", e),
        }
    }

    fn stop_capture_watch(&self) {
        let watch = self
            .capture_watch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(watch) = watch {
            watch.stop();
        }
    }

    /// Livraison de la capture. Retourne `Ok(false)` si aucune capture n'était attendue.
    pub fn on_content_captured(&mut self, pixels: &PixelBuffer) -> anyhow::Result<bool> {
        self.check_capture_timeout();

        let run = {
            let mut shared = self.lock();
            if shared.state != ControllerState::Capturing {
                debug!("Capture delivered in state {:?}, ignored", shared.state);
                return Ok(false);
            }
            match shared.pending.take() {
                Some(run) => run,
                None => {
                    shared.state = ControllerState::Idle;
                    return Ok(false);
                }
            }
        };
        self.stop_capture_watch();

        let frame_interval = Duration::from_millis(run.config.runtime.frame_interval_ms);
        let mut system = match ParticleSystem::new(run.config) {
            Ok(system) => system,
            Err(e) => {
                self.lock().state = ControllerState::Idle;
                return Err(e);
            }
        };
        let particles = system.generate_particles(pixels, run.effect, self.clock.now_ms());

        {
            let mut shared = self.lock();
            shared.state = ControllerState::Running;
            shared.on_complete = Some(run.on_complete);
            shared.latest = Some(system.particle_data());
            shared.completion = system.completion_percentage();
        }
        send_event(&self.events_tx, ControllerEvent::Started { particles });

        {
            let (lock, _) = &*self.running_pair;
            *lock.lock().unwrap_or_else(|e| e.into_inner()) = true;
        }
        let (commands_tx, commands_rx) = unbounded();
        let frame_loop = FrameLoop {
            system,
            clock: Arc::clone(&self.clock),
            shared: Arc::clone(&self.shared),
            running_pair: Arc::clone(&self.running_pair),
            events: self.events_tx.clone(),
            commands: commands_rx,
            frame_interval,
        };

        let spawned = thread::Builder::new()
            .name("particlize-frame-loop".into())
            .spawn(move || frame_loop.run());
        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                self.commands = Some(commands_tx);
                Ok(true)
            }
            Err(e) => {
                let mut shared = self.lock();
                shared.state = ControllerState::Idle;
                shared.on_complete = None;
                shared.latest = None;
                Err(anyhow::Error::new(e).context("failed to spawn the frame loop thread"))
            }
        }
    }

    pub fn pause(&self) {
        self.send_command(LoopCommand::Pause);
    }

    pub fn resume(&self) {
        self.send_command(LoopCommand::Resume);
    }

    fn send_command(&self, command: LoopCommand) {
        if let Some(commands) = &self.commands {
            // boucle déjà terminée : rien à piloter
            let _ = commands.send(command);
        }
    }

    /// Dernière frame publiée par la boucle (`None` hors exécution).
    pub fn latest_frame(&self) -> Option<Arc<ParticleFrame>> {
        self.lock().latest.clone()
    }

    /// Progression lissée de l'effet en cours, pour le fondu du contenu d'origine.
    pub fn completion_percentage(&self) -> f32 {
        self.lock().completion
    }

    /// Arrête la boucle (et l'attend) puis libère tout. Idempotent.
    pub fn cleanup(&mut self) {
        {
            let (lock, cvar) = &*self.running_pair;
            let mut running = lock.lock().unwrap_or_else(|e| e.into_inner());
            *running = false;
            cvar.notify_all();
        }

        self.stop_capture_watch();

        if let Some(handle) = self.handle.take() {
            // depuis le callback de fin on est sur le thread de la boucle
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                warn!("⚠️ Frame loop thread panicked");
            }
        }
        self.commands = None;

        let mut shared = self.lock();
        if shared.state != ControllerState::Destroyed {
            info!("🧹 Controller cleaned up from {:?}", shared.state);
        }
        shared.state = ControllerState::Destroyed;
        shared.pending = None;
        shared.on_complete = None;
        shared.latest = None;
    }
}

impl Drop for ParticlizeController {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn lock_shared(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Abandonne la capture en cours si son échéance est dépassée.
fn expire_capture(
    clock: &dyn Clock,
    shared: &Mutex<Shared>,
    events: &Sender<ControllerEvent>,
) -> bool {
    let mut guard = lock_shared(shared);
    let expired = match (&guard.state, &guard.pending) {
        (ControllerState::Capturing, Some(pending)) => {
            let waited = clock.now_ms().saturating_sub(pending.requested_at_ms);
            waited > pending.config.runtime.capture_timeout_ms
        }
        _ => false,
    };
    if expired {
        guard.state = ControllerState::Idle;
        guard.pending = None;
        drop(guard);
        warn!("⏱️ Content capture timed out, back to Idle");
        send_event(events, ControllerEvent::CaptureTimedOut);
    }
    expired
}

/// Thread de surveillance d'une capture en attente.
struct CaptureWatch {
    watching_pair: Arc<(Mutex<bool>, Condvar)>,
    handle: thread::JoinHandle<()>,
}

impl CaptureWatch {
    fn stop(self) {
        {
            let (lock, cvar) = &*self.watching_pair;
            *lock.lock().unwrap_or_else(|e| e.into_inner()) = false;
            cvar.notify_all();
        }
        if self.handle.join().is_err() {
            warn!("⚠️ Capture watch thread panicked");
        }
    }
}

/// Vérifie l'échéance toutes les `poll` tant que la capture est attendue,
/// sans dépendre des appels de l'hôte.
fn watch_capture(
    clock: Arc<dyn Clock>,
    shared: Arc<Mutex<Shared>>,
    events: Sender<ControllerEvent>,
    watching_pair: Arc<(Mutex<bool>, Condvar)>,
    poll: Duration,
) {
    loop {
        {
            let (lock, cvar) = &*watching_pair;
            let watching = lock.lock().unwrap_or_else(|e| e.into_inner());
            let (watching, _) = cvar
                .wait_timeout_while(watching, poll, |watching| *watching)
                .unwrap_or_else(|e| e.into_inner());
            if !*watching {
                return;
            }
        }
        if expire_capture(&*clock, &shared, &events) {
            return;
        }
        if lock_shared(&shared).state != ControllerState::Capturing {
            return;
        }
    }
}

fn send_event(events: &Sender<ControllerEvent>, event: ControllerEvent) {
    if let ControllerEvent::Redraw { .. } = event {
        // l'hôte ne lit pas assez vite : les Redraw sont redondants entre eux
        if let Err(TrySendError::Full(event)) = events.try_send(event) {
            debug!("Event channel full, {:?} dropped", event);
        }
        return;
    }
    if let Err(SendTimeoutError::Timeout(event)) =
        events.send_timeout(event, LIFECYCLE_EVENT_TIMEOUT)
    {
        warn!("⚠️ Event channel stalled, {:?} lost", event);
    }
}

/// État possédé par le thread de la boucle de frames.
struct FrameLoop {
    system: ParticleSystem,
    clock: Arc<dyn Clock>,
    shared: Arc<Mutex<Shared>>,
    running_pair: Arc<(Mutex<bool>, Condvar)>,
    events: Sender<ControllerEvent>,
    commands: Receiver<LoopCommand>,
    frame_interval: Duration,
}

impl FrameLoop {
    fn run(mut self) {
        info!("🔁 Frame loop started ({:?} per frame)", self.frame_interval);

        loop {
            let now = self.clock.now_ms();
            for command in self.commands.try_iter() {
                match command {
                    LoopCommand::Pause => self.system.pause(now),
                    LoopCommand::Resume => self.system.resume(now),
                }
            }

            let keep_running = self.system.update_animation(now);
            {
                let mut shared = lock_shared(&self.shared);
                if shared.state != ControllerState::Running {
                    // nettoyé pendant la frame
                    break;
                }
                shared.latest = Some(self.system.particle_data());
                shared.completion = self.system.completion_percentage();
            }
            send_event(
                &self.events,
                ControllerEvent::Redraw {
                    frame: self.system.frame_count(),
                },
            );

            if !keep_running {
                self.finish();
                return;
            }

            if !self.wait_next_frame() {
                break;
            }
        }
        info!("🛑 Frame loop cancelled at frame {}", self.system.frame_count());
    }

    /// Attend la prochaine frame. `false` si un arrêt a été demandé.
    fn wait_next_frame(&self) -> bool {
        let (lock, cvar) = &*self.running_pair;
        let running = lock.lock().unwrap_or_else(|e| e.into_inner());
        if !*running {
            return false;
        }
        let (running, _) = cvar
            .wait_timeout_while(running, self.frame_interval, |running| *running)
            .unwrap_or_else(|e| e.into_inner());
        *running
    }

    fn finish(self) {
        let callback = {
            let mut shared = lock_shared(&self.shared);
            shared.state = ControllerState::Destroyed;
            shared.latest = None;
            shared.completion = 1.0;
            shared.on_complete.take()
        };
        info!(
            "✅ Effect completed after {} frames",
            self.system.frame_count()
        );
        // la simulation est libérée avant de rendre la main à l'hôte
        drop(self.system);
        if let Some(callback) = callback {
            callback();
        }
        send_event(&self.events, ControllerEvent::Completed);
    }
}

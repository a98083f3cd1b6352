use log::debug;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Valeur de métrique typée (compteur, flottant ou durée)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Usize(usize),
    F32(f32),
    Duration(Duration),
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Usize(v)
    }
}
impl From<f32> for MetricValue {
    fn from(v: f32) -> Self {
        MetricValue::F32(v)
    }
}
impl From<Duration> for MetricValue {
    fn from(v: Duration) -> Self {
        MetricValue::Duration(v)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Usize(u) => write!(f, "{}", u),
            MetricValue::F32(v) => write!(f, "{:.2}", v),
            MetricValue::Duration(d) => write!(f, "{:.2?}", d),
        }
    }
}

impl MetricValue {
    fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Usize(u) => *u as f64,
            MetricValue::F32(v) => *v as f64,
            MetricValue::Duration(d) => d.as_secs_f64(),
        }
    }

    /// Reconstruit une valeur du même genre que `self` à partir d'un f64.
    fn same_kind(&self, value: f64) -> MetricValue {
        match self {
            MetricValue::Usize(_) => MetricValue::Usize(value.round().max(0.0) as usize),
            MetricValue::F32(_) => MetricValue::F32(value as f32),
            MetricValue::Duration(_) => MetricValue::Duration(Duration::from_secs_f64(value.max(0.0))),
        }
    }
}

/// Fenêtre glissante de taille fixe.
#[derive(Debug)]
struct Window<T> {
    values: VecDeque<T>,
    max: usize,
}

impl<T> Window<T> {
    fn new(max: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(max),
            max: max.max(1),
        }
    }

    fn push(&mut self, value: T) {
        if self.values.len() >= self.max {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }
}

#[derive(Debug)]
struct ProfilerInner {
    /// Durées (ms) par bloc mesuré
    samples: HashMap<String, Window<f32>>,
    /// Valeurs scalaires typées
    metrics: HashMap<String, Window<MetricValue>>,
    /// Durées (ms) des frames complètes
    frame_times: Window<f32>,
    max_samples: usize,
}

/// Profiler partagé et thread-safe : les clones pointent vers les mêmes fenêtres.
#[derive(Debug, Clone)]
pub struct Profiler {
    inner: Arc<RwLock<ProfilerInner>>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new(120)
    }
}

impl Profiler {
    pub fn new(max_samples: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ProfilerInner {
                samples: HashMap::new(),
                metrics: HashMap::new(),
                frame_times: Window::new(max_samples),
                max_samples: max_samples.max(1),
            })),
        }
    }

    // un panic pendant une mesure ne doit pas rendre le profiler inutilisable
    fn read(&self) -> RwLockReadGuard<'_, ProfilerInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProfilerInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push_sample(&self, label: String, ms: f32) {
        let mut inner = self.write();
        let max = inner.max_samples;
        inner
            .samples
            .entry(label)
            .or_insert_with(|| Window::new(max))
            .push(ms);
    }

    /// Mesure d'une frame complète (RAII)
    pub fn frame(&self) -> FrameGuard {
        FrameGuard {
            profiler: self.clone(),
            start: Instant::now(),
        }
    }

    /// Mesure d'un bloc labelisé (RAII)
    pub fn measure(&self, label: impl Into<String>) -> MeasureGuard<'_> {
        MeasureGuard {
            profiler: self,
            label: label.into(),
            start: Instant::now(),
        }
    }

    /// Profile un bloc de code et retourne sa valeur de retour
    pub fn profile_block<T, F>(&self, label: impl Into<String>, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        self.push_sample(label.into(), start.elapsed().as_secs_f32() * 1000.0);
        result
    }

    /// Enregistre une métrique scalaire typée
    pub fn record_metric<T: Into<MetricValue>>(&self, label: impl Into<String>, value: T) {
        let mut inner = self.write();
        let max = inner.max_samples;
        inner
            .metrics
            .entry(label.into())
            .or_insert_with(|| Window::new(max))
            .push(value.into());
    }

    /// FPS moyen sur la fenêtre des frames
    pub fn fps(&self) -> f32 {
        let inner = self.read();
        let times = &inner.frame_times.values;
        if times.is_empty() {
            return 0.0;
        }
        let avg = times.iter().sum::<f32>() / times.len() as f32;
        if avg <= 0.0 {
            return 0.0;
        }
        1000.0 / avg
    }

    /// Nombre de frames dans la fenêtre courante
    pub fn total_frames(&self) -> usize {
        self.read().frame_times.values.len()
    }

    /// Résumé des temps mesurés en ms (moyenne, min, max)
    pub fn summary(&self) -> HashMap<String, (f32, f32, f32)> {
        self.read()
            .samples
            .iter()
            .filter(|(_, w)| !w.values.is_empty())
            .map(|(k, w)| (k.clone(), summarize_series(w.values.iter().copied())))
            .collect()
    }

    /// Résumé des métriques scalaires (moyenne, min, max)
    pub fn metrics_summary(&self) -> HashMap<String, (MetricValue, MetricValue, MetricValue)> {
        self.read()
            .metrics
            .iter()
            .filter_map(|(k, w)| summarize_metric(&w.values).map(|s| (k.clone(), s)))
            .collect()
    }

    /// Résumé pour une métrique spécifique
    pub fn metric_summary(&self, label: &str) -> Option<(MetricValue, MetricValue, MetricValue)> {
        self.read()
            .metrics
            .get(label)
            .and_then(|w| summarize_metric(&w.values))
    }

    /// Dernière valeur enregistrée pour une métrique
    pub fn last_metric(&self, label: &str) -> Option<MetricValue> {
        self.read()
            .metrics
            .get(label)
            .and_then(|w| w.values.back().copied())
    }

    /// Vide toutes les fenêtres
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.samples.clear();
        inner.metrics.clear();
        inner.frame_times.values.clear();
    }

    /// Log les résumés vers le target donné (niveau debug)
    pub fn log_metrics_for_target(&self, target: &str, show_fps: bool) {
        if show_fps {
            debug!(target: target, "{:.2} FPS", self.fps());
        }
        for (label, (avg, min, max)) in self.summary() {
            debug!(
                target: target,
                "{}: avg = {:.3} ms | min = {:.3} ms | max = {:.3} ms",
                label, avg, min, max
            );
        }
        for (label, (avg, min, max)) in self.metrics_summary() {
            debug!(target: target, "{label}: avg={avg}, min={min}, max={max}");
        }
    }
}

/// (moyenne, min, max) d'une série de f32 non vide
fn summarize_series(series: impl Iterator<Item = f32>) -> (f32, f32, f32) {
    let (count, sum, min, max) = series.fold(
        (0usize, 0.0f32, f32::MAX, f32::MIN),
        |(count, sum, min, max), v| (count + 1, sum + v, min.min(v), max.max(v)),
    );
    (sum / count.max(1) as f32, min, max)
}

/// (moyenne, min, max) d'une série typée ; le genre suit la première valeur.
pub fn summarize_metric<'a, I>(series: I) -> Option<(MetricValue, MetricValue, MetricValue)>
where
    I: IntoIterator<Item = &'a MetricValue>,
{
    let mut iter = series.into_iter();
    let first = *iter.next()?;
    let start = first.as_f64();
    let (count, sum, min, max) = iter.fold((1usize, start, start, start), |acc, v| {
        let x = v.as_f64();
        (acc.0 + 1, acc.1 + x, acc.2.min(x), acc.3.max(x))
    });
    Some((
        first.same_kind(sum / count as f64),
        first.same_kind(min),
        first.same_kind(max),
    ))
}

/// Mesure d'une frame complète
pub struct FrameGuard {
    profiler: Profiler,
    start: Instant,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let dt = self.start.elapsed().as_secs_f32() * 1000.0;
        self.profiler.write().frame_times.push(dt);
    }
}

/// Mesure d'un bloc labelisé (RAII)
pub struct MeasureGuard<'a> {
    profiler: &'a Profiler,
    label: String,
    start: Instant,
}

impl Drop for MeasureGuard<'_> {
    fn drop(&mut self) {
        let dt = self.start.elapsed().as_secs_f32() * 1000.0;
        self.profiler
            .push_sample(std::mem::take(&mut self.label), dt);
    }
}

/// Macro helper : déduit automatiquement le target via le module appelant
// module_path!() est évaluée à la compilation, dans le module de l'appelant.
#[macro_export]
macro_rules! log_metrics {
    ($profiler:expr) => {
        $profiler.log_metrics_for_target(module_path!(), false);
    };
}

#[macro_export]
macro_rules! log_metrics_and_fps {
    ($profiler:expr) => {
        $profiler.log_metrics_for_target(module_path!(), true);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_last_samples() {
        let profiler = Profiler::new(3);
        for i in 1..=5usize {
            profiler.record_metric("active", i);
        }
        let (avg, min, max) = profiler.metric_summary("active").unwrap();
        assert_eq!(avg, MetricValue::Usize(4));
        assert_eq!(min, MetricValue::Usize(3));
        assert_eq!(max, MetricValue::Usize(5));
        assert_eq!(profiler.last_metric("active"), Some(MetricValue::Usize(5)));
    }

    #[test]
    fn profile_block_returns_value_and_records() {
        let profiler = Profiler::new(8);
        let v = profiler.profile_block("physics", || 41 + 1);
        assert_eq!(v, 42);
        {
            let _guard = profiler.measure("emission");
        }
        let summary = profiler.summary();
        assert!(summary.contains_key("physics"));
        assert!(summary.contains_key("emission"));
    }

    #[test]
    fn frames_are_counted_and_clear_resets() {
        let profiler = Profiler::new(4);
        for _ in 0..6 {
            let _frame = profiler.frame();
        }
        assert_eq!(profiler.total_frames(), 4);
        profiler.clear();
        assert_eq!(profiler.total_frames(), 0);
        assert_eq!(profiler.fps(), 0.0);
    }

    #[test]
    fn summary_of_many_samples_does_not_overflow() {
        // plus de 255 échantillons
        let profiler = Profiler::new(1000);
        for _ in 0..600 {
            profiler.record_metric("alpha", 0.5f32);
        }
        let (avg, _, _) = profiler.metric_summary("alpha").unwrap();
        assert_eq!(avg, MetricValue::F32(0.5));
    }
}

//! Script replay.

use std::path::PathBuf;
use std::time::Duration;

use inkpad_core::{
    DeviceEvent, Instant, Outbox, StrokeChange, StrokeDocument, StrokeSet, SurfaceConfig, SurfaceController,
};

use crate::AppError;
use crate::script::{Script, ScriptSurface, Step};

/// Inputs and outputs of one replay run.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub script: PathBuf,
    pub config: Option<PathBuf>,
    /// Stroke document to start from.
    pub load: Option<PathBuf>,
    /// Where to write the final frame as SVG.
    pub svg: Option<PathBuf>,
    /// Where to write the final stroke document.
    pub save: Option<PathBuf>,
}

/// What a replay produced.
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    /// Device events handled by the controller.
    pub events: usize,
    /// Frame callbacks the controller asked for.
    pub frames_requested: usize,
    /// Animation frames that did work.
    pub frames_run: usize,
    /// Changes emitted for the sync transport, in order.
    pub outgoing: Vec<StrokeChange>,
    pub strokes: StrokeSet,
    /// Final frame.
    pub svg: String,
}

type Controller = SurfaceController<ScriptSurface, Outbox>;

/// Run `script` against a fresh controller, starting from `initial` strokes.
pub fn replay(script: &Script, config: SurfaceConfig, initial: Option<StrokeDocument>) -> ReplayReport {
    let mut controller = Controller::new(config, Outbox::new());
    if let Some(document) = initial {
        let paths = document.into_stroke_set().into_paths();
        log::info!("Loaded {} strokes", paths.len());
        controller.apply_remote(StrokeChange::Added { paths });
    }
    controller.attach(ScriptSurface::new(&script.surface));

    let mut report = ReplayReport::default();
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;

    for step in &script.steps {
        let now = start + elapsed;
        match step {
            Step::Event { event } => {
                report.events += dispatch(&mut controller, event.clone(), now);
            }
            Step::Tool { tool } => controller.set_tool(*tool),
            Step::PalmRejection { enabled } => controller.set_palm_rejection(*enabled),
            Step::StrokeColor { color } => controller.set_stroke_color(color.clone()),
            Step::StrokeWidth { width } => controller.set_stroke_width(*width),
            Step::ZoomIn => {
                controller.zoom_in();
            }
            Step::ZoomOut => {
                controller.zoom_out();
            }
            Step::Remote { change } => {
                controller.apply_remote(change.clone());
            }
            Step::MoveSurface { origin } => {
                if let Some(surface) = controller.surface_mut() {
                    surface.set_origin(*origin);
                }
            }
            Step::Resize { size } => {
                if let Some(surface) = controller.surface_mut() {
                    surface.set_size(*size);
                }
                report.events += dispatch(&mut controller, DeviceEvent::Resize, now);
            }
            Step::Wait { ms } => {
                elapsed += Duration::from_millis(*ms);
                controller.tick(start + elapsed);
            }
            Step::Frame => {
                if controller.on_animation_frame() {
                    report.frames_run += 1;
                }
            }
        }
        collect_outgoing(&mut controller, &mut report);
    }

    // Flush a pending resize and whatever frame is still owed
    if let Some(deadline) = controller.next_deadline() {
        controller.tick(deadline);
    }
    if controller.on_animation_frame() {
        report.frames_run += 1;
    }

    report.strokes = controller.strokes().clone();
    if let Some(surface) = controller.detach() {
        report.frames_requested = surface.frames_requested();
        report.svg = surface.svg().to_svg();
    }
    report
}

fn dispatch(controller: &mut Controller, event: DeviceEvent, now: Instant) -> usize {
    let delivered = controller
        .surface()
        .is_some_and(|surface| surface.dispatch(event));
    if !delivered {
        log::warn!("Surface not bound, event dropped");
    }
    controller.pump(now)
}

fn collect_outgoing(controller: &mut Controller, report: &mut ReplayReport) {
    for change in controller.transport_mut().take_outgoing() {
        match &change {
            StrokeChange::Added { paths } => log::info!("Outgoing: added {} stroke(s)", paths.len()),
            StrokeChange::Removed { ids } => log::info!("Outgoing: removed {:?}", ids),
        }
        report.outgoing.push(change);
    }
}

/// Load inputs from disk, replay, and write the requested outputs.
pub fn run_replay(options: &ReplayOptions) -> Result<ReplayReport, AppError> {
    let config = match &options.config {
        Some(path) => SurfaceConfig::load(path)?,
        None => SurfaceConfig::default(),
    };
    let script = Script::load(&options.script)?;
    let initial = options.load.as_ref().map(StrokeDocument::load).transpose()?;

    log::info!("Replaying {} steps from {}", script.steps.len(), options.script.display());
    let report = replay(&script, config, initial);
    log::info!(
        "Replay done: {} events, {} frames, {} strokes",
        report.events,
        report.frames_run,
        report.strokes.len()
    );

    if let Some(path) = &options.svg {
        std::fs::write(path, &report.svg)
            .map_err(|e| AppError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Wrote {}", path.display());
    }
    if let Some(path) = &options.save {
        StrokeDocument::from_stroke_set(&report.strokes).save(path)?;
        log::info!("Wrote {}", path.display());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SurfaceLayout;
    use inkpad_core::{Path, Phase, PointerKind, ToolKind};
    use kurbo::Point;

    fn pointer(phase: Phase, x: f64, y: f64) -> Step {
        Step::Event {
            event: DeviceEvent::Pointer {
                phase,
                pointer_id: 1,
                position: Point::new(x, y),
                kind: PointerKind::Mouse,
            },
        }
    }

    fn stroke(from: (f64, f64), to: (f64, f64)) -> Vec<Step> {
        vec![
            pointer(Phase::Down, from.0, from.1),
            pointer(Phase::Move, to.0, to.1),
            pointer(Phase::Up, to.0, to.1),
        ]
    }

    #[test]
    fn test_draw_then_erase() {
        let mut steps = stroke((10.0, 10.0), (50.0, 10.0));
        steps.push(Step::Tool { tool: ToolKind::Erase });
        steps.extend(stroke((52.0, 12.0), (52.0, 12.0)));
        let script = Script {
            surface: SurfaceLayout::default(),
            steps,
        };

        let report = replay(&script, SurfaceConfig::default(), None);

        assert_eq!(report.events, 6);
        assert_eq!(report.outgoing.len(), 2);
        let added_id = match &report.outgoing[0] {
            StrokeChange::Added { paths } => paths[0].id.clone(),
            other => panic!("unexpected change: {other:?}"),
        };
        assert_eq!(report.outgoing[1], StrokeChange::Removed { ids: vec![added_id] });
        assert!(report.strokes.is_empty());
        assert_eq!(report.svg.matches("<path ").count(), 0);
    }

    #[test]
    fn test_remote_strokes_render_and_do_not_echo() {
        let remote = Path::from_points("r", "#00f", 2.0, vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
        let script = Script {
            surface: SurfaceLayout::default(),
            steps: vec![
                Step::Remote {
                    change: StrokeChange::Added { paths: vec![remote.clone()] },
                },
                Step::Remote {
                    change: StrokeChange::Added { paths: vec![remote] },
                },
                Step::Frame,
            ],
        };

        let report = replay(&script, SurfaceConfig::default(), None);
        assert!(report.outgoing.is_empty());
        assert_eq!(report.strokes.len(), 1);
        assert_eq!(report.svg.matches("<path ").count(), 1);
        assert_eq!(report.frames_run, 1);
    }

    #[test]
    fn test_pan_scrolls_rendering() {
        let mut steps = vec![Step::Tool { tool: ToolKind::Pan }];
        steps.extend(stroke((100.0, 100.0), (90.0, 95.0)));
        let script = Script {
            surface: SurfaceLayout::default(),
            steps,
        };
        let strokes: StrokeSet = vec![Path::from_points(
            "a",
            "#000",
            1.0,
            vec![Point::new(10.0, 5.0), Point::new(20.0, 5.0)],
        )]
        .into_iter()
        .collect();
        let initial = StrokeDocument::from_stroke_set(&strokes);

        let report = replay(&script, SurfaceConfig::default(), Some(initial));
        assert!(report.outgoing.is_empty());
        // Scrolled by (10, 5), so the stroke starts at the surface origin
        assert!(report.svg.contains(r#"d="M0"#));
    }

    #[test]
    fn test_resize_is_debounced() {
        let script = Script {
            surface: SurfaceLayout::default(),
            steps: vec![
                Step::Frame,
                Step::Resize {
                    size: kurbo::Size::new(400.0, 200.0),
                },
                Step::Resize {
                    size: kurbo::Size::new(300.0, 100.0),
                },
                Step::Wait { ms: 100 },
            ],
        };

        let report = replay(&script, SurfaceConfig::default(), None);
        assert_eq!(report.events, 2);
        assert!(report.svg.contains(r#"width="300" height="100""#));
    }

    #[test]
    fn test_run_replay_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        let script = Script {
            surface: SurfaceLayout::default(),
            steps: stroke((0.0, 0.0), (40.0, 40.0)),
        };
        std::fs::write(&script_path, serde_json::to_string(&script).unwrap()).unwrap();

        let options = ReplayOptions {
            script: script_path,
            svg: Some(dir.path().join("out.svg")),
            save: Some(dir.path().join("out.json")),
            ..ReplayOptions::default()
        };
        let report = run_replay(&options).unwrap();

        let saved = StrokeDocument::load(dir.path().join("out.json")).unwrap();
        assert_eq!(saved.strokes.len(), 1);
        assert_eq!(saved.strokes, report.strokes.paths());
        let svg = std::fs::read_to_string(dir.path().join("out.svg")).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn test_missing_script_is_io_error() {
        let options = ReplayOptions {
            script: PathBuf::from("/nonexistent/script.json"),
            ..ReplayOptions::default()
        };
        assert!(matches!(run_replay(&options), Err(AppError::Io(_))));
    }
}

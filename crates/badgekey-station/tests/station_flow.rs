//! End-to-end flows through the station loop with mock devices.
//!
//! Every test runs the station and a scripted operator on one task with the
//! clock paused, so cooldowns and print latencies elapse instantly and in a
//! fixed order.

use badgekey_card::mock::{CaptureBehavior, LayoutBehavior, MockCardRenderer, MockRendererHandle};
use badgekey_hardware::mock::{MockCamera, MockCameraHandle, MockPrinter, MockPrinterHandle};
use badgekey_session::{SessionHandle, SessionStore, VisitorDirectory};
use badgekey_station::{
    GateConfig, JobOutcome, PipelineConfig, PrintPipeline, PrintStatus, Station, StationEvent,
    StationHandle, StatusMessages,
};
use std::time::Duration;
use tokio::time::{sleep, timeout};

type TestStation = Station<MockCamera, MockCardRenderer, MockPrinter>;

struct Rig {
    station: TestStation,
    handle: StationHandle,
    camera: MockCameraHandle,
    renderer: MockRendererHandle,
    printer: MockPrinterHandle,
    session: SessionHandle,
}

fn rig() -> Rig {
    let (camera, camera_handle) = MockCamera::new();
    let (renderer, renderer_handle) = MockCardRenderer::new();
    let (printer, printer_handle) = MockPrinter::new();
    let session = SessionHandle::new(SessionStore::seeded());

    let pipeline = PrintPipeline::new(renderer, printer, PipelineConfig::default());
    let (station, handle) = Station::new(
        camera,
        VisitorDirectory::seeded(),
        session.clone(),
        pipeline,
        &GateConfig::default(),
    );

    Rig {
        station,
        handle,
        camera: camera_handle,
        renderer: renderer_handle,
        printer: printer_handle,
        session,
    }
}

/// Collect events up to and including the next `JobFinished`.
async fn until_job_finished(handle: &mut StationHandle) -> Vec<StationEvent> {
    let collect = async {
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            let finished = matches!(event, StationEvent::JobFinished { .. });
            events.push(event);
            if finished {
                break;
            }
        }
        events
    };

    timeout(Duration::from_secs(60), collect)
        .await
        .expect("station should finish the job")
}

fn outcome(events: &[StationEvent]) -> &JobOutcome {
    match events.last() {
        Some(StationEvent::JobFinished { outcome, .. }) => outcome,
        other => panic!("expected JobFinished, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_repeated_decode_within_cooldown_records_once() {
    let Rig {
        station,
        mut handle,
        camera,
        printer,
        session,
        ..
    } = rig();

    let script = async {
        assert!(camera.present("1").await.unwrap());
        sleep(Duration::from_millis(100)).await;
        assert!(!camera.present("1").await.unwrap());

        let events = until_job_finished(&mut handle).await;
        handle.shutdown().await.unwrap();
        events
    };

    let (result, events) = tokio::join!(station.run(), script);
    result.unwrap();

    assert!(matches!(&events[0], StationEvent::ScanRecorded(record) if record.visitor.id == "1"));
    assert!(outcome(&events).is_printed());
    assert_eq!(session.scan_count().await, 1);
    assert_eq!(printer.printed_count(), 1);
    assert_eq!(camera.delivered(), 1);
    assert!(camera.discarded() >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_frames_forwards_one() {
    let Rig {
        station,
        mut handle,
        camera,
        session,
        ..
    } = rig();

    let script = async {
        camera.present_burst("1", 30).await.unwrap();
        until_job_finished(&mut handle).await;
        handle.shutdown().await.unwrap();
    };

    let (result, ()) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(session.scan_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_busy_pipeline_rejects_scan_after_cooldown() {
    let Rig {
        station,
        mut handle,
        camera,
        printer,
        session,
        ..
    } = rig();
    printer.set_latency(Duration::from_secs(8));

    let script = async {
        assert!(camera.present("1").await.unwrap());

        // Decode cooldown is over, the first card is still printing.
        sleep(Duration::from_secs(6)).await;
        assert_eq!(handle.status(), PrintStatus::Printing);
        assert!(!camera.present("1").await.unwrap());

        until_job_finished(&mut handle).await;
        assert_eq!(handle.status(), PrintStatus::Idle);

        sleep(Duration::from_millis(100)).await;
        assert!(camera.is_enabled());
        assert!(camera.present("1").await.unwrap());
        until_job_finished(&mut handle).await;

        handle.shutdown().await.unwrap();
    };

    let (result, ()) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(session.scan_count().await, 2);
    assert_eq!(printer.printed_count(), 2);
    assert_eq!(camera.discarded(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_capture_failure_releases_pipeline() {
    let Rig {
        station,
        mut handle,
        camera,
        renderer,
        printer,
        session,
    } = rig();
    renderer.set_capture(CaptureBehavior::Fail);

    let script = async {
        camera.present("1").await.unwrap();
        let events = until_job_finished(&mut handle).await;
        assert_eq!(handle.status(), PrintStatus::Idle);

        // The decode cooldown still holds after a fast failure.
        sleep(Duration::from_secs(1)).await;
        assert!(!camera.present("1").await.unwrap());

        sleep(Duration::from_millis(4_100)).await;
        assert!(camera.present("1").await.unwrap());
        until_job_finished(&mut handle).await;

        handle.shutdown().await.unwrap();
        events
    };

    let (result, events) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(outcome(&events).message(), StatusMessages::CAPTURE_FAILED);
    assert!(!renderer.is_mounted());
    assert_eq!(printer.attempts(), 0);
    // Failed prints keep their scan.
    assert_eq!(session.scan_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_print_failure_message() {
    let Rig {
        station,
        mut handle,
        camera,
        printer,
        ..
    } = rig();
    printer.set_unavailable(true);

    let script = async {
        camera.present("1").await.unwrap();
        let events = until_job_finished(&mut handle).await;
        handle.shutdown().await.unwrap();
        events
    };

    let (result, events) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(outcome(&events).message(), StatusMessages::PRINT_FAILED);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_layout_reports_card_unavailable() {
    let Rig {
        station,
        mut handle,
        camera,
        renderer,
        ..
    } = rig();
    renderer.set_layout(LayoutBehavior::Stalled);

    let script = async {
        camera.present("1").await.unwrap();
        let events = until_job_finished(&mut handle).await;
        handle.shutdown().await.unwrap();
        events
    };

    let (result, events) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(outcome(&events).message(), StatusMessages::CARD_UNAVAILABLE);
    assert!(!renderer.is_mounted());
}

#[tokio::test(start_paused = true)]
async fn test_observed_status_sequence() {
    let Rig {
        station,
        mut handle,
        camera,
        renderer,
        printer,
        ..
    } = rig();
    renderer.set_layout(LayoutBehavior::Delayed(Duration::from_millis(100)));
    renderer.set_capture_latency(Duration::from_millis(100));
    printer.set_latency(Duration::from_millis(100));
    let mut status = handle.subscribe_status();

    let watcher = async {
        let mut seen = Vec::new();
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            seen.push(current);
            if current == PrintStatus::Idle {
                break;
            }
        }
        seen
    };

    let script = async {
        camera.present("1").await.unwrap();
        until_job_finished(&mut handle).await;
        handle.shutdown().await.unwrap();
    };

    let (result, seen, ()) = tokio::join!(station.run(), watcher, script);
    result.unwrap();

    assert_eq!(
        seen,
        vec![
            PrintStatus::Preparing,
            PrintStatus::Capturing,
            PrintStatus::Printing,
            PrintStatus::Done,
            PrintStatus::Idle,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_cancels_job() {
    let Rig {
        station,
        mut handle,
        camera,
        renderer,
        printer,
        session,
    } = rig();
    printer.set_latency(Duration::from_secs(10));

    let script = async {
        camera.present("1").await.unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.status(), PrintStatus::Printing);

        handle.dismiss().await.unwrap();
        let events = until_job_finished(&mut handle).await;
        assert_eq!(handle.status(), PrintStatus::Idle);
        assert!(!renderer.is_mounted());

        // Cancelling does not strand the gate.
        sleep(Duration::from_secs(5)).await;
        assert!(camera.present("1").await.unwrap());
        let second = until_job_finished(&mut handle).await;
        assert!(matches!(second[0], StationEvent::ScanRecorded(_)));

        handle.shutdown().await.unwrap();
        events
    };

    let (result, events) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(outcome(&events), &JobOutcome::Cancelled);
    assert_eq!(session.scan_count().await, 2);
    assert_eq!(printer.attempts(), 2);
    assert_eq!(printer.printed_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_during_done_hold_counts_as_printed() {
    let Rig {
        station,
        mut handle,
        camera,
        renderer,
        printer,
        ..
    } = rig();
    let mut status = handle.subscribe_status();

    let script = async {
        camera.present("1").await.unwrap();
        status
            .wait_for(|current| *current == PrintStatus::Done)
            .await
            .unwrap();

        handle.dismiss().await.unwrap();
        let events = until_job_finished(&mut handle).await;
        assert_eq!(handle.status(), PrintStatus::Idle);

        handle.shutdown().await.unwrap();
        events
    };

    let (result, events) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(outcome(&events), &JobOutcome::Printed);
    assert_eq!(outcome(&events).message(), StatusMessages::DONE);
    assert_eq!(printer.printed_count(), 1);
    assert!(!renderer.is_mounted());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_job() {
    let Rig {
        station,
        mut handle,
        camera,
        renderer,
        printer,
        ..
    } = rig();
    printer.set_latency(Duration::from_secs(10));

    let script = async {
        camera.present("1").await.unwrap();
        sleep(Duration::from_secs(1)).await;
        handle.shutdown().await.unwrap();
        until_job_finished(&mut handle).await
    };

    let (result, events) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(outcome(&events), &JobOutcome::Cancelled);
    assert!(!renderer.is_mounted());
    assert!(!camera.is_enabled());
    assert!(handle.next_event().await.is_none());
    assert!(handle.dismiss().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_unrecognized_code_keeps_cooldown() {
    let Rig {
        station,
        mut handle,
        camera,
        renderer,
        session,
        ..
    } = rig();

    let script = async {
        camera.present("999").await.unwrap();
        let unrecognized = timeout(Duration::from_secs(1), handle.next_event())
            .await
            .unwrap();

        sleep(Duration::from_secs(1)).await;
        assert!(!camera.present("1").await.unwrap());

        sleep(Duration::from_millis(4_100)).await;
        assert!(camera.present("1").await.unwrap());
        let events = until_job_finished(&mut handle).await;

        handle.shutdown().await.unwrap();
        (unrecognized, events)
    };

    let (result, (unrecognized, events)) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(
        unrecognized,
        Some(StationEvent::Unrecognized {
            payload: "999".to_string()
        })
    );
    assert_eq!(events.len(), 2);
    assert_eq!(renderer.mounts().len(), 1);
    assert_eq!(session.scan_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_camera_disconnect_is_reported() {
    let Rig {
        station,
        mut handle,
        camera,
        ..
    } = rig();

    let script = async {
        drop(camera);
        let event = timeout(Duration::from_secs(1), handle.next_event())
            .await
            .unwrap();
        handle.shutdown().await.unwrap();
        event
    };

    let (result, event) = tokio::join!(station.run(), script);
    result.unwrap();

    assert!(matches!(event, Some(StationEvent::CameraError(_))));
}

#[tokio::test(start_paused = true)]
async fn test_queued_frame_dropped_by_gate_during_cooldown() {
    let Rig {
        station,
        mut handle,
        camera,
        renderer,
        session,
        ..
    } = rig();
    camera.set_deliver_queued(true);

    // Both frames are waiting in the camera before the loop reads either.
    assert!(camera.present("999").await.unwrap());
    assert!(camera.present("1").await.unwrap());

    let script = async {
        let first = timeout(Duration::from_secs(1), handle.next_event())
            .await
            .unwrap();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(camera.delivered(), 2);
        assert_eq!(session.scan_count().await, 0);

        sleep(Duration::from_millis(4_100)).await;
        assert!(camera.present("1").await.unwrap());
        until_job_finished(&mut handle).await;

        handle.shutdown().await.unwrap();
        first
    };

    let (result, first) = tokio::join!(station.run(), script);
    result.unwrap();

    assert_eq!(
        first,
        Some(StationEvent::Unrecognized {
            payload: "999".to_string()
        })
    );
    assert_eq!(renderer.mounts().len(), 1);
    assert_eq!(session.scan_count().await, 1);
    assert_eq!(camera.discarded(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_queued_duplicates_dropped_while_job_runs() {
    let Rig {
        station,
        mut handle,
        camera,
        printer,
        session,
        ..
    } = rig();
    camera.set_deliver_queued(true);
    assert_eq!(camera.present_burst("1", 3).await.unwrap(), 3);

    let script = async {
        let events = until_job_finished(&mut handle).await;
        handle.shutdown().await.unwrap();
        events
    };

    let (result, events) = tokio::join!(station.run(), script);
    result.unwrap();

    assert!(outcome(&events).is_printed());
    assert_eq!(camera.delivered(), 3);
    assert_eq!(session.scan_count().await, 1);
    assert_eq!(printer.printed_count(), 1);
}

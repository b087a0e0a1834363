//! End-to-end bridge tests over the loopback transport.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use gites_core::bridge::{
    bounded_channel, Bridge, LockedDays, LoopbackHandle, LoopbackTransport, Role, UiCommand,
    UiMessage,
};
use gites_core::{
    AuthCommand, AuthReply, AuthStorage, Config, Gites, GroupId, ImageRequest, MemoryStore,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::json;
use tokio::sync::mpsc;

type TestBridge = Bridge<LoopbackTransport, MemoryStore>;

fn build_bridge(
    role: Role,
    captures: &Path,
    exports: &Path,
) -> (TestBridge, LoopbackHandle, mpsc::Receiver<UiMessage>) {
    let mut config = Config::default();
    config.export.capture_delay_ms = 0;
    config.export.output_dir = exports.to_string_lossy().into_owned();
    let gites = Gites::new(config);
    let config = gites.config();

    let (transport, handle) = LoopbackTransport::new(&config.channel);
    let (outbox, messages) = bounded_channel(&config.channel);
    let auth = AuthStorage::new(MemoryStore::new(), config.storage.auth_key.clone());
    let bridge = Bridge::new(
        role,
        &config.channel,
        transport,
        auth,
        gites.services(captures),
        outbox,
    );
    (bridge, handle, messages)
}

async fn next_message(messages: &mut mpsc::Receiver<UiMessage>) -> UiMessage {
    tokio::time::timeout(Duration::from_secs(10), messages.recv())
        .await
        .expect("timed out waiting for a UI message")
        .expect("outbox closed")
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbImage::from_pixel(width, height, image::Rgb([40, 120, 200]));
    let image = DynamicImage::ImageRgb8(pixels);
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[tokio::test]
async fn test_admin_joins_at_start_and_ignores_need_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let (mut bridge, handle, mut messages) = build_bridge(Role::Admin, dir.path(), dir.path());

    bridge.start().await.unwrap();
    assert!(bridge.connection().is_joined());
    assert_eq!(
        handle.joins(),
        vec![("bookings:locked_days".to_string(), json!({"uuid": "bookingsAdmin"}))]
    );

    handle.emit("need_refresh", json!({})).await.unwrap();
    handle.emit("new_booking", json!({})).await.unwrap();
    assert_eq!(next_message(&mut messages).await, UiMessage::BroadcastRefresh);

    let days = json!({"lockedDays": [[19500, 19503]]});
    handle
        .emit("broadcast_initial_locked_days", days.clone())
        .await
        .unwrap();
    assert_eq!(
        next_message(&mut messages).await,
        UiMessage::ReceiveInitialLockedDays(days)
    );
}

#[tokio::test]
async fn test_rejected_admin_join_keeps_local_ports_working() {
    let dir = tempfile::tempdir().unwrap();
    let (bridge, handle, mut messages) = build_bridge(Role::Admin, dir.path(), dir.path());
    handle.reject_joins("unauthorized");
    let (commands, inbox) = mpsc::channel(8);

    let running = tokio::spawn(bridge.run(inbox));
    commands
        .send(UiCommand::ToAuthLocalStorage(AuthCommand::Get))
        .await
        .unwrap();
    assert_eq!(
        next_message(&mut messages).await,
        UiMessage::FromAuthLocalStorage(AuthReply::error())
    );
    assert_eq!(handle.joins().len(), 1);
    assert!(!handle.is_joined());

    drop(commands);
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_guest_joins_on_request_and_rejoins_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let (mut bridge, mut handle, mut messages) = build_bridge(Role::Guest, dir.path(), dir.path());

    bridge.start().await.unwrap();
    assert!(!bridge.connection().is_joined());
    assert!(handle.joins().is_empty());

    // Pushing before joining is refused without tearing the bridge down
    assert!(bridge.handle(UiCommand::RequestRefresh).await.is_err());

    bridge
        .handle(UiCommand::JoinChannel("guest-1".to_string()))
        .await
        .unwrap();
    bridge
        .handle(UiCommand::JoinChannel("guest-2".to_string()))
        .await
        .unwrap();
    let uuids: Vec<_> = handle
        .joins()
        .into_iter()
        .map(|(_, params)| params["uuid"].clone())
        .collect();
    assert_eq!(uuids, vec![json!("guest-1"), json!("guest-2")]);

    handle.emit("need_refresh", json!({})).await.unwrap();
    assert_eq!(next_message(&mut messages).await, UiMessage::BroadcastRefreshAv);

    bridge
        .handle(UiCommand::BroadcastLockedDays(LockedDays {
            c_in: 19500,
            c_out: 19504,
        }))
        .await
        .unwrap();
    let pushed = handle.next_push().await.unwrap();
    assert_eq!(pushed.event, "days_locked");
    assert_eq!(pushed.payload, json!({"cIn": 19500, "cOut": 19504}));
}

#[tokio::test]
async fn test_image_requests_answer_on_the_outbox() {
    let dir = tempfile::tempdir().unwrap();
    let (mut bridge, _handle, mut messages) = build_bridge(Role::Admin, dir.path(), dir.path());

    bridge
        .handle(UiCommand::ToImageProcessor(ImageRequest::from_bytes(
            "terrace.png",
            &png(1000, 1200),
        )))
        .await
        .unwrap();
    match next_message(&mut messages).await {
        UiMessage::ProcessedImages(result) => {
            assert_eq!(result.filename, "terrace.png");
            assert_eq!((result.width, result.height), (500, 600));
            assert!(result.content.starts_with("data:image/jpeg;base64,"));
            assert!(result.thumb.starts_with("data:image/jpeg;base64,"));
            assert!(result.size > 0);
        }
        other => panic!("unexpected message: {other:?}"),
    }

    bridge
        .handle(UiCommand::ToImageProcessor(ImageRequest {
            filename: "broken.jpg".to_string(),
            image_data: "not a data uri".to_string(),
        }))
        .await
        .unwrap();
    match next_message(&mut messages).await {
        UiMessage::ImageFailed { filename, .. } => assert_eq!(filename, "broken.jpg"),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_save_pdf_writes_document() {
    let captures = tempfile::tempdir().unwrap();
    let exports = tempfile::tempdir().unwrap();
    let group_dir = captures.path().join("calendar");
    std::fs::create_dir(&group_dir).unwrap();
    // Two tall captures cannot share an A4 sheet
    std::fs::write(group_dir.join("01.png"), png(210, 200)).unwrap();
    std::fs::write(group_dir.join("02.png"), png(210, 200)).unwrap();

    let (mut bridge, _handle, mut messages) = build_bridge(Role::Admin, captures.path(), exports.path());
    bridge
        .handle(UiCommand::SavePdf(GroupId::new("calendar")))
        .await
        .unwrap();

    match next_message(&mut messages).await {
        UiMessage::PdfReady { group, path, pages } => {
            assert_eq!(group, GroupId::new("calendar"));
            assert_eq!(pages, 2);
            assert_eq!(path, exports.path().join("calendar.pdf"));
            let bytes = std::fs::read(&path).unwrap();
            assert!(bytes.starts_with(b"%PDF"));
        }
        other => panic!("unexpected message: {other:?}"),
    }

    bridge
        .handle(UiCommand::SavePdf(GroupId::new("../escape")))
        .await
        .unwrap();
    match next_message(&mut messages).await {
        UiMessage::PdfFailed { group, .. } => assert_eq!(group, GroupId::new("../escape")),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_auth_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (mut bridge, _handle, mut messages) = build_bridge(Role::Admin, dir.path(), dir.path());

    bridge
        .handle(UiCommand::ToAuthLocalStorage(AuthCommand::Get))
        .await
        .unwrap();
    assert_eq!(
        next_message(&mut messages).await,
        UiMessage::FromAuthLocalStorage(AuthReply::error())
    );

    bridge
        .handle(UiCommand::ToAuthLocalStorage(AuthCommand::Set {
            payload: json!({"jwt": "abc.def", "username": "marie"}),
        }))
        .await
        .unwrap();
    assert_eq!(
        next_message(&mut messages).await,
        UiMessage::FromAuthLocalStorage(AuthReply::ok())
    );

    bridge
        .handle(UiCommand::ToAuthLocalStorage(AuthCommand::Get))
        .await
        .unwrap();
    match next_message(&mut messages).await {
        UiMessage::FromAuthLocalStorage(AuthReply::Session { jwt, username, .. }) => {
            assert_eq!(jwt, "abc.def");
            assert_eq!(username, "marie");
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_run_processes_commands_until_ui_closes() {
    let dir = tempfile::tempdir().unwrap();
    let (bridge, mut handle, mut messages) = build_bridge(Role::Guest, dir.path(), dir.path());
    let (commands, inbox) = mpsc::channel(8);

    let running = tokio::spawn(bridge.run(inbox));
    for command in [
        json!({"port": "joinChannel", "payload": "guest-7"}),
        json!({"port": "requestRefresh"}),
        json!({"port": "toImageProcessor", "payload": {"filename": "x", "imageData": "data:,"}}),
    ] {
        commands
            .send(serde_json::from_value::<UiCommand>(command).unwrap())
            .await
            .unwrap();
    }

    let pushed = handle.next_push().await.unwrap();
    assert_eq!(pushed.event, "request_refresh");

    drop(commands);
    running.await.unwrap().unwrap();

    assert!(matches!(
        next_message(&mut messages).await,
        UiMessage::ImageFailed { .. }
    ));
    assert!(!handle.is_joined());
}

#[tokio::test]
async fn test_failed_rejoin_keeps_forwarding_events() {
    let dir = tempfile::tempdir().unwrap();
    let (mut bridge, handle, mut messages) = build_bridge(Role::Guest, dir.path(), dir.path());

    bridge.start().await.unwrap();
    bridge
        .handle(UiCommand::JoinChannel("guest-1".to_string()))
        .await
        .unwrap();

    handle.fail_leaves();
    assert!(bridge
        .handle(UiCommand::JoinChannel("guest-2".to_string()))
        .await
        .is_err());
    assert!(bridge.connection().is_joined());
    assert_eq!(handle.joins().len(), 1);

    handle.emit("need_refresh", json!({})).await.unwrap();
    assert_eq!(next_message(&mut messages).await, UiMessage::BroadcastRefreshAv);
}

#[tokio::test]
async fn test_finished_tasks_are_collected_while_serving() {
    let dir = tempfile::tempdir().unwrap();
    let (mut bridge, _handle, mut messages) = build_bridge(Role::Guest, dir.path(), dir.path());

    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        bridge
            .handle(UiCommand::ToImageProcessor(ImageRequest {
                filename: name.to_string(),
                image_data: "not a data uri".to_string(),
            }))
            .await
            .unwrap();
        assert!(matches!(
            next_message(&mut messages).await,
            UiMessage::ImageFailed { .. }
        ));
    }

    // Every later command collects whatever has finished by then
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            bridge
                .handle(UiCommand::ToAuthLocalStorage(AuthCommand::Get))
                .await
                .unwrap();
            next_message(&mut messages).await;
            if bridge.pending_tasks() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("finished tasks were never collected");
}

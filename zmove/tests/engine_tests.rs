mod common;

use common::*;
use tokio_util::sync::CancellationToken;
use zmove::protocol::*;
use zmove::{AttributesStore, OpsError, OpsResult};

fn token() -> CancellationToken {
    CancellationToken::new()
}

#[tokio::test]
async fn same_system_mover_wins_over_cross_system_when_route_exists() {
    let fixture = test_engine();

    let same_system = move_copy_op(
        member_attrs("PAYROLL.SRC", "MEMBER1", &["sysa"]),
        FileAttributes::Dataset(dataset_attrs("PAYROLL.TARGET", DatasetOrganization::Po, &["sysa"])),
        false,
    );
    assert_eq!(fixture.engine.classify(&same_system), Some("member-to-pds"));

    let cross_system = move_copy_op(
        member_attrs("PAYROLL.SRC", "MEMBER1", &["sysa"]),
        FileAttributes::Dataset(dataset_attrs("PAYROLL.TARGET", DatasetOrganization::Po, &["sysb"])),
        false,
    );
    assert_eq!(
        fixture.engine.classify(&cross_system),
        Some("cross-system-file-to-pds")
    );
}

#[tokio::test]
async fn every_reachable_combination_selects_exactly_one_runner() {
    let fixture = test_engine();
    let combinations = vec![
        move_copy_op(
            member_attrs("A.SRC", "M1", &["sysa"]),
            FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysa"])),
            false,
        ),
        move_copy_op(
            FileAttributes::Dataset(dataset_attrs("A.SEQ", DatasetOrganization::Ps, &["sysa"])),
            FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysa"])),
            false,
        ),
        move_copy_op(
            uss_attrs("/u/alice/a.txt", false, &["sysa"]),
            uss_attrs("/u/bob", true, &["sysa"]),
            false,
        ),
        move_copy_op(
            uss_attrs("/u/alice/a.txt", false, &["sysa"]),
            FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysa"])),
            false,
        ),
        move_copy_op(
            member_attrs("A.SRC", "M1", &["sysa"]),
            uss_attrs("/u/bob", true, &["sysa"]),
            false,
        ),
        move_copy_op(
            FileAttributes::Dataset(dataset_attrs("A.PDS", DatasetOrganization::Po, &["sysa"])),
            uss_attrs("/u/bob", true, &["sysa"]),
            false,
        ),
        move_copy_op(
            member_attrs("A.SRC", "M1", &["sysa"]),
            uss_attrs("/u/bob", true, &["sysb"]),
            false,
        ),
        move_copy_op(
            uss_attrs("/u/alice/a.txt", false, &["sysa"]),
            FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysb"])),
            false,
        ),
        move_copy_op(
            uss_attrs("/u/alice/proj", true, &["sysa"]),
            uss_attrs("/u/bob", true, &["sysb"]),
            false,
        ),
        move_copy_op(
            FileAttributes::Dataset(dataset_attrs("A.PDS", DatasetOrganization::Po, &["sysa"])),
            uss_attrs("/u/bob", true, &["sysb"]),
            false,
        ),
    ];
    let expected = vec![
        "member-to-pds",
        "sequential-to-pds",
        "uss-to-uss",
        "uss-file-to-pds",
        "dataset-to-uss",
        "pds-to-uss-folder",
        "cross-system-file-to-uss-dir",
        "cross-system-file-to-pds",
        "cross-system-uss-dir",
        "cross-system-pds-to-uss-dir",
    ];
    for (operation, runner) in combinations.iter().zip(expected) {
        assert_eq!(fixture.engine.classify(operation), Some(runner));
    }
}

#[tokio::test]
async fn member_move_issues_copy_then_delete() {
    let fixture = test_engine();
    let operation = move_copy_op(
        member_attrs("PAYROLL.SRC", "MEMBER1", &["sysa"]),
        FileAttributes::Dataset(dataset_attrs("PAYROLL.TARGET", DatasetOrganization::Po, &["sysa"])),
        true,
    );

    fixture.engine.perform(&operation, &token()).await.unwrap();

    let copies = fixture.client.calls_of("copy_to_dataset_member");
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].connection, "sysa");
    assert_eq!(copies[0].target, "PAYROLL.TARGET(MEMBER1) <- PAYROLL.SRC(MEMBER1)");

    let deletes = fixture.client.calls_of("delete_dataset_member");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].target, "PAYROLL.SRC(MEMBER1)");
}

#[tokio::test]
async fn member_move_rejection_issues_no_delete_and_names_both_datasets() {
    let fixture = test_engine();
    fixture.client.stub(
        "copy_to_dataset_member",
        Ok(RemoteResponse::failure(500, "ISRZ002 copy failed")),
    );
    let operation = move_copy_op(
        member_attrs("PAYROLL.SRC", "MEMBER1", &["sysa"]),
        FileAttributes::Dataset(dataset_attrs("PAYROLL.TARGET", DatasetOrganization::Po, &["sysa"])),
        true,
    );

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();

    assert!(matches!(err, OpsError::RemoteCallFailed { .. }));
    let text = err.to_string();
    assert!(text.contains("PAYROLL.SRC"));
    assert!(text.contains("PAYROLL.TARGET"));
    assert!(fixture.client.calls_of("delete_dataset_member").is_empty());
}

#[tokio::test]
async fn copy_never_deletes_the_source() {
    let fixture = test_engine();
    let operation = move_copy_op(
        member_attrs("PAYROLL.SRC", "MEMBER1", &["sysa"]),
        FileAttributes::Dataset(dataset_attrs("PAYROLL.TARGET", DatasetOrganization::Po, &["sysa"])),
        false,
    );

    fixture.engine.perform(&operation, &token()).await.unwrap();

    assert_eq!(fixture.client.calls_of("copy_to_dataset_member").len(), 1);
    assert!(fixture.client.calls_of("delete_dataset_member").is_empty());
    assert!(fixture.client.calls_of("delete_dataset").is_empty());
}

#[tokio::test]
async fn moving_directory_into_its_descendant_is_rejected_without_network_calls() {
    let fixture = test_engine();
    let operation = move_copy_op(
        uss_attrs("/u/alice/proj", true, &["sysa"]),
        uss_attrs("/u/alice/proj/sub", true, &["sysa"]),
        true,
    );

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();

    assert!(matches!(err, OpsError::NoHandlerFound { .. }));
    assert_eq!(fixture.client.total_calls(), 0);

    let onto_itself = move_copy_op(
        uss_attrs("/u/alice/proj", true, &["sysa"]),
        uss_attrs("/u/alice/proj", true, &["sysa"]),
        false,
    );
    let err = fixture.engine.perform(&onto_itself, &token()).await.unwrap_err();
    assert!(matches!(err, OpsError::NoHandlerFound { .. }));
    assert_eq!(fixture.client.total_calls(), 0);
}

#[tokio::test]
async fn transport_failure_falls_through_to_next_common_connection() {
    let fixture = test_engine();
    fixture.client.stub(
        "copy_to_dataset_member",
        Err(OpsError::Transport {
            call: "copy".to_string(),
            connection: "sysa".to_string(),
            reason: "connection refused".to_string(),
        }),
    );
    let operation = move_copy_op(
        member_attrs("A.SRC", "M1", &["sysa", "sysb"]),
        FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysa", "sysb"])),
        false,
    );

    fixture.engine.perform(&operation, &token()).await.unwrap();

    let copies = fixture.client.calls_of("copy_to_dataset_member");
    assert_eq!(copies.len(), 2);
    assert_eq!(copies[0].connection, "sysa");
    assert_eq!(copies[1].connection, "sysb");
}

#[tokio::test]
async fn remote_rejection_stops_the_connection_loop() {
    let fixture = test_engine();
    fixture.client.stub(
        "copy_to_dataset_member",
        Ok(RemoteResponse::failure(409, "member in use")),
    );
    let operation = move_copy_op(
        member_attrs("A.SRC", "M1", &["sysa", "sysb"]),
        FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysa", "sysb"])),
        false,
    );

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();

    assert!(matches!(err, OpsError::RemoteCallFailed { status: 409, .. }));
    assert_eq!(fixture.client.calls_of("copy_to_dataset_member").len(), 1);
}

#[tokio::test]
async fn empty_sequential_dataset_copy_counts_as_success() {
    let fixture = test_engine();
    fixture.client.stub(
        "copy_to_dataset_member",
        Ok(RemoteResponse::failure(500, "the input data set is empty")),
    );
    let operation = move_copy_op(
        FileAttributes::Dataset(dataset_attrs("A.SEQ", DatasetOrganization::Ps, &["sysa"])),
        FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysa"])),
        false,
    );

    fixture.engine.perform(&operation, &token()).await.unwrap();
}

#[tokio::test]
async fn uss_file_to_pds_tolerates_record_truncation() {
    let fixture = test_engine();
    fixture.client.stub(
        "copy_uss_to_dataset_member",
        Ok(RemoteResponse::failure(
            500,
            "Truncation of a record occurred during an I/O operation.",
        )),
    );
    let operation = move_copy_op(
        uss_attrs("/u/alice/report-2024.txt", false, &["sysa"]),
        FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysa"])),
        false,
    );

    fixture.engine.perform(&operation, &token()).await.unwrap();

    let copies = fixture.client.calls_of("copy_uss_to_dataset_member");
    assert_eq!(copies.len(), 1);
    // report-2024.txt -> alphanumerics only, eight chars, uppercased
    assert!(copies[0].target.starts_with("A.TGT(REPORT20)"));
}

#[tokio::test]
async fn pds_member_failure_rolls_back_created_directory() {
    let fixture = test_engine();
    fixture.client.stub_members("A.PDS", &["M1", "M2", "M3"]);
    fixture.client.stub("copy_to_uss", Ok(RemoteResponse::ok()));
    fixture.client.stub("copy_to_uss", Ok(RemoteResponse::ok()));
    fixture
        .client
        .stub("copy_to_uss", Ok(RemoteResponse::failure(500, "no space")));

    let operation = move_copy_op(
        FileAttributes::Dataset(dataset_attrs("A.PDS", DatasetOrganization::Po, &["sysa"])),
        uss_attrs("/u/bob", true, &["sysa"]),
        false,
    );

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();

    assert!(matches!(
        err,
        OpsError::PartialFailureWithRollback {
            rollback_succeeded: true,
            ..
        }
    ));
    assert!(err.to_string().contains("Rollback proceeded successfully"));
    assert_eq!(fixture.client.calls_of("copy_to_uss").len(), 3);

    let deletes = fixture.client.calls_of("delete_uss_item");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].target, "/u/bob/A.PDS recursive=true");
}

#[tokio::test]
async fn pds_rollback_failure_is_reported_distinctly() {
    let fixture = test_engine();
    fixture.client.stub_members("A.PDS", &["M1"]);
    fixture
        .client
        .stub("copy_to_uss", Ok(RemoteResponse::failure(500, "no space")));
    fixture
        .client
        .stub("delete_uss_item", Ok(RemoteResponse::failure(500, "busy")));

    let operation = move_copy_op(
        FileAttributes::Dataset(dataset_attrs("A.PDS", DatasetOrganization::Po, &["sysa"])),
        uss_attrs("/u/bob", true, &["sysa"]),
        false,
    );

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();

    assert!(matches!(
        err,
        OpsError::PartialFailureWithRollback {
            rollback_succeeded: false,
            ..
        }
    ));
    assert!(err.to_string().contains("Rollback failed"));
}

#[tokio::test]
async fn pds_move_source_delete_is_best_effort() {
    let fixture = test_engine();
    fixture.client.stub_members("A.PDS", &["M1", "M2"]);
    fixture
        .client
        .stub("delete_dataset", Ok(RemoteResponse::failure(500, "in use")));

    let operation = move_copy_op(
        FileAttributes::Dataset(dataset_attrs("A.PDS", DatasetOrganization::Po, &["sysa"])),
        uss_attrs("/u/bob", true, &["sysa"]),
        true,
    );

    // The failed source deletion never overturns the successful copy.
    fixture.engine.perform(&operation, &token()).await.unwrap();
    assert_eq!(fixture.client.calls_of("copy_to_uss").len(), 2);
    assert_eq!(fixture.client.calls_of("delete_dataset").len(), 1);
}

#[tokio::test]
async fn cancelled_member_loop_rolls_back_and_reports_cancellation() {
    let fixture = test_engine();
    fixture.client.stub_members("A.PDS", &["M1", "M2"]);
    let cancel = token();
    cancel.cancel();

    let operation = move_copy_op(
        FileAttributes::Dataset(dataset_attrs("A.PDS", DatasetOrganization::Po, &["sysa"])),
        uss_attrs("/u/bob", true, &["sysa"]),
        false,
    );

    let err = fixture.engine.perform(&operation, &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(fixture.client.calls_of("copy_to_uss").is_empty());
}

#[tokio::test]
async fn symlink_cross_system_move_fails_with_zero_network_calls() {
    let fixture = test_engine();
    let operation = move_copy_op(
        symlink_attrs("/u/alice/link", "/u/alice/real", &["sysa"]),
        uss_attrs("/u/bob", true, &["sysb"]),
        true,
    );

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();

    assert!(matches!(err, OpsError::UnsupportedOperation { .. }));
    assert!(err.to_string().contains("/u/alice/real"));
    assert_eq!(fixture.client.total_calls(), 0);
    assert!(fixture.synchronizer.fetched().is_empty());
}

#[tokio::test]
async fn missing_synchronizer_fails_before_any_network_call() {
    let fixture = test_engine_without_synchronizer();
    let operation = move_copy_op(
        uss_attrs("/u/alice/a.txt", false, &["sysa"]),
        uss_attrs("/u/bob", true, &["sysb"]),
        false,
    );

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();

    assert!(matches!(err, OpsError::MissingCollaborator { .. }));
    assert_eq!(fixture.client.total_calls(), 0);
}

#[tokio::test]
async fn cross_system_directory_copy_stages_each_file_once() {
    let fixture = test_engine();
    fixture.client.stub_uss_children(
        "/u/alice/proj",
        vec![
            UssChild {
                name: "a.txt".to_string(),
                is_directory: false,
                symlink_target: None,
            },
            UssChild {
                name: "b.txt".to_string(),
                is_directory: false,
                symlink_target: None,
            },
            UssChild {
                name: "c.txt".to_string(),
                is_directory: false,
                symlink_target: None,
            },
        ],
    );

    let operation = move_copy_op(
        uss_attrs("/u/alice/proj", true, &["sysa"]),
        uss_attrs("/u/bob/dest", true, &["sysb"]),
        false,
    );

    fixture.engine.perform(&operation, &token()).await.unwrap();

    // One created directory, one staged pull and one upload per file, and
    // no remote-to-remote copy of any kind.
    let creates = fixture.client.calls_of("create_uss_item");
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].connection, "sysb");
    assert_eq!(creates[0].target, "/u/bob/dest/proj (directory)");

    assert_eq!(fixture.synchronizer.fetched().len(), 3);

    let writes = fixture.client.calls_of("write_uss_file");
    assert_eq!(writes.len(), 3);
    assert!(writes.iter().all(|w| w.connection == "sysb"));

    assert!(fixture.client.calls_of("copy_uss_item").is_empty());
    assert!(fixture.client.calls_of("copy_to_uss").is_empty());

    let listings = fixture.client.calls_of("list_uss_children");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].connection, "sysa");
}

#[tokio::test]
async fn cross_system_transfer_to_pds_normalizes_text_records() {
    let fixture = test_engine();
    fixture
        .synchronizer
        .stub_content("/u/alice/notes.txt", zmove::StagedContent::text(b"a\r\nb".to_vec()));

    let operation = move_copy_op(
        uss_attrs("/u/alice/notes.txt", false, &["sysa"]),
        FileAttributes::Dataset(dataset_attrs("A.TGT", DatasetOrganization::Po, &["sysb"])),
        false,
    );

    fixture.engine.perform(&operation, &token()).await.unwrap();

    let writes = fixture.client.calls_of("write_dataset_member");
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].connection, "sysb");
    assert_eq!(writes[0].body.as_deref(), Some(b"a\nb\n".as_slice()));
}

#[tokio::test]
async fn uss_rename_moves_to_sibling_path() {
    let fixture = test_engine();
    let attributes = uss_attrs("/u/alice/old.txt", false, &["sysa"]);
    let file = handle_for(&attributes);
    fixture.store.register(&file, attributes.clone());

    let operation = Operation::Rename(RenameOperation {
        file: file.clone(),
        attributes,
        new_name: "new.txt".to_string(),
    });
    fixture.engine.perform(&operation, &token()).await.unwrap();

    let moves = fixture.client.calls_of("move_uss_item");
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].target, "/u/alice/new.txt <- /u/alice/old.txt");
    assert!(fixture
        .store
        .attributes_of(&FileHandle::remote("/u/alice/new.txt", false))
        .is_some());
}

#[tokio::test]
async fn rename_tries_next_requester_and_surfaces_last_error() {
    let fixture = test_engine();
    fixture
        .client
        .stub("rename_dataset", Ok(RemoteResponse::failure(500, "locked")));
    let attributes =
        FileAttributes::Dataset(dataset_attrs("A.OLD", DatasetOrganization::Ps, &["sysa", "sysb"]));
    let operation = Operation::Rename(RenameOperation {
        file: handle_for(&attributes),
        attributes,
        new_name: "A.NEW".to_string(),
    });

    // First requester rejects, second succeeds: first success wins.
    fixture.engine.perform(&operation, &token()).await.unwrap();
    assert_eq!(fixture.client.calls_of("rename_dataset").len(), 2);

    // Both requesters reject: the last error surfaces.
    let fixture = test_engine();
    fixture
        .client
        .stub("rename_dataset", Ok(RemoteResponse::failure(500, "locked")));
    fixture
        .client
        .stub("rename_dataset", Ok(RemoteResponse::failure(423, "still locked")));
    let attributes =
        FileAttributes::Dataset(dataset_attrs("A.OLD", DatasetOrganization::Ps, &["sysa", "sysb"]));
    let operation = Operation::Rename(RenameOperation {
        file: handle_for(&attributes),
        attributes,
        new_name: "A.NEW".to_string(),
    });
    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();
    assert!(matches!(err, OpsError::RemoteCallFailed { status: 423, .. }));
}

#[tokio::test]
async fn delete_uses_first_successful_requester() {
    let fixture = test_engine();
    fixture.client.stub(
        "delete_uss_item",
        Err(OpsError::Transport {
            call: "delete".to_string(),
            connection: "sysa".to_string(),
            reason: "timeout".to_string(),
        }),
    );
    let attributes = uss_attrs("/u/alice/old.txt", false, &["sysa", "sysb"]);
    let file = handle_for(&attributes);
    fixture.store.register(&file, attributes.clone());

    let operation = Operation::Delete(DeleteOperation {
        file: file.clone(),
        attributes,
    });
    fixture.engine.perform(&operation, &token()).await.unwrap();

    assert_eq!(fixture.client.calls_of("delete_uss_item").len(), 2);
    assert!(fixture.store.attributes_of(&file).is_none());
}

#[tokio::test]
async fn allocators_are_selected_by_request_type() {
    let fixture = test_engine();

    let dataset = Operation::Allocate(AllocationOperation {
        connection: connection("sysa"),
        params: AllocationParams::Dataset(DatasetAllocationParams::partitioned("A.NEW")),
    });
    fixture.engine.perform(&dataset, &token()).await.unwrap();
    assert_eq!(fixture.client.calls_of("create_dataset").len(), 1);

    let member = Operation::Allocate(AllocationOperation {
        connection: connection("sysa"),
        params: AllocationParams::Member(MemberAllocationParams {
            dataset: "A.NEW".to_string(),
            member: "first".to_string(),
        }),
    });
    fixture.engine.perform(&member, &token()).await.unwrap();
    let writes = fixture.client.calls_of("write_dataset_member");
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].target, "A.NEW(FIRST) (text)");
    assert_eq!(writes[0].body.as_deref(), Some(&[] as &[u8]));

    let uss = Operation::Allocate(AllocationOperation {
        connection: connection("sysa"),
        params: AllocationParams::Uss(UssAllocationParams {
            path: "/u/alice/newdir".to_string(),
            kind: UssItemKind::Directory,
            mode: FileMode::new(7, 5, 5),
        }),
    });
    fixture.engine.perform(&uss, &token()).await.unwrap();
    assert_eq!(fixture.client.calls_of("create_uss_item").len(), 1);
}

#[tokio::test]
async fn allocation_failure_names_target_and_connection() {
    let fixture = test_engine();
    fixture
        .client
        .stub("create_dataset", Ok(RemoteResponse::failure(409, "exists")));
    let operation = Operation::Allocate(AllocationOperation {
        connection: connection("sysa"),
        params: AllocationParams::Dataset(DatasetAllocationParams::sequential("A.EXISTS")),
    });

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("A.EXISTS"));
    assert!(text.contains("sysa"));
}

#[tokio::test]
async fn invalid_dataset_name_fails_before_any_call() {
    let fixture = test_engine();
    let operation = Operation::Allocate(AllocationOperation {
        connection: connection("sysa"),
        params: AllocationParams::Dataset(DatasetAllocationParams::sequential("9BAD..NAME")),
    });

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();
    assert!(matches!(err, OpsError::InvalidName { .. }));
    assert_eq!(fixture.client.total_calls(), 0);
}

#[tokio::test]
async fn local_file_upload_reads_disk_and_writes_destination() -> OpsResult<()> {
    let fixture = test_engine();
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("hello.txt");
    tokio::fs::write(&file_path, b"hello from the workstation\n").await?;

    let destination = uss_attrs("/u/bob", true, &["sysb"]);
    let operation = Operation::MoveCopy(MoveCopyOperation {
        source: FileHandle::local(file_path.to_string_lossy().to_string(), false),
        source_attributes: None,
        destination: handle_for(&destination),
        destination_attributes: Some(destination),
        is_move: false,
        force_overwriting: false,
        new_name: None,
        unit: None,
    });

    assert_eq!(fixture.engine.classify(&operation), Some("local-file-to-uss-dir"));
    fixture.engine.perform(&operation, &token()).await?;

    let writes = fixture.client.calls_of("write_uss_file");
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].target, "/u/bob/hello.txt (text)");
    assert_eq!(
        writes[0].body.as_deref(),
        Some(b"hello from the workstation\n".as_slice())
    );
    assert!(file_path.exists());
    Ok(())
}

#[tokio::test]
async fn local_move_removes_the_workstation_file_only_after_upload() -> OpsResult<()> {
    let fixture = test_engine();
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("hello.txt");
    tokio::fs::write(&file_path, b"payload").await?;

    let destination = uss_attrs("/u/bob", true, &["sysb"]);
    let make_op = |is_move| {
        Operation::MoveCopy(MoveCopyOperation {
            source: FileHandle::local(file_path.to_string_lossy().to_string(), false),
            source_attributes: None,
            destination: handle_for(&destination),
            destination_attributes: Some(destination.clone()),
            is_move,
            force_overwriting: false,
            new_name: None,
            unit: None,
        })
    };

    fixture
        .client
        .stub("write_uss_file", Ok(RemoteResponse::failure(507, "no space")));
    assert!(fixture.engine.perform(&make_op(true), &token()).await.is_err());
    assert!(file_path.exists());

    fixture.engine.perform(&make_op(true), &token()).await?;
    assert!(!file_path.exists());
    Ok(())
}

#[tokio::test]
async fn no_handler_error_names_operation_and_kinds() {
    let fixture = test_engine();
    // Remote USS file into a sequential dataset: nothing accepts this.
    let operation = move_copy_op(
        uss_attrs("/u/alice/a.txt", false, &["sysa"]),
        FileAttributes::Dataset(dataset_attrs("A.SEQ", DatasetOrganization::Ps, &["sysa"])),
        false,
    );

    let err = fixture.engine.perform(&operation, &token()).await.unwrap_err();
    let text = err.to_string();
    assert!(matches!(err, OpsError::NoHandlerFound { .. }));
    assert!(text.contains("uss file"));
    assert!(text.contains("sequential dataset"));
}

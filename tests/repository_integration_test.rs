// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 验证文件数据库上的写入 / 查询 / 删除流程，
//          以及重新打开连接后数据仍然存在
// ==========================================


use it_asset_tracker::domain::import::WriteErrorKind;
use it_asset_tracker::domain::{AssetPatch, AssetQuery, NewAsset};
use it_asset_tracker::repository::{AssetRepository, AssetRepositoryImpl, RepositoryError};
use test_helpers::create_test_db;

fn new_asset(serial: &str, department: &str) -> NewAsset {
    NewAsset {
        serial_number: Some(serial.to_string()),
        department: Some(department.to_string()),
        device: Some("Laptop".to_string()),
        created_by: "tester".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_insert_many_persists_across_connections() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    {
        let repo = AssetRepositoryImpl::new(&db_path).expect("Failed to create repository");
        let outcome = repo
            .insert_many(vec![
                new_asset("r-1", "Eng"),
                new_asset("R-2", "Eng"),
                new_asset("R-1", "Ops"),
            ])
            .await
            .unwrap();
        assert_eq!(outcome.inserted.len(), 2);
        assert_eq!(outcome.write_errors.len(), 1);
        assert_eq!(outcome.write_errors[0].index, 2);
        assert_eq!(outcome.write_errors[0].kind, WriteErrorKind::DuplicateKey);
    }

    let repo = AssetRepositoryImpl::new(&db_path).expect("Failed to reopen repository");
    assert_eq!(repo.count(false).await.unwrap(), 2);
    assert!(repo.exists_by_serial("r-2").await.unwrap());
}

#[tokio::test]
async fn test_search_filter_and_paging() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = AssetRepositoryImpl::new(&db_path).expect("Failed to create repository");

    let records: Vec<NewAsset> = (0..25)
        .map(|i| new_asset(&format!("PG-{:02}", i), if i % 5 == 0 { "Finance" } else { "Eng" }))
        .collect();
    repo.insert_many(records).await.unwrap();

    let page = repo
        .list(&AssetQuery {
            page: Some(3),
            limit: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 5);

    let finance = repo
        .list(&AssetQuery {
            department: Some("Finance".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(finance.total, 5);

    // LIKE 通配符按字面匹配
    let none = repo
        .list(&AssetQuery {
            search: Some("%".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(none.total, 0);
}

#[tokio::test]
async fn test_update_soft_delete_and_stats() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = AssetRepositoryImpl::new(&db_path).expect("Failed to create repository");

    let a = repo.insert_one(new_asset("U-1", "Eng")).await.unwrap();
    let b = repo.insert_one(new_asset("U-2", "Ops")).await.unwrap();

    let updated = repo
        .update(
            &a.id,
            AssetPatch {
                status: Some("Retired".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "Retired");
    assert!(updated.updated_at >= a.updated_at);

    let err = repo
        .update(
            &a.id,
            AssetPatch {
                status: Some("Sold".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::CheckConstraintViolation(_)));

    repo.set_deleted(&b.id, true).await.unwrap();
    let stats = repo.stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.by_status[0].key, "Retired");

    repo.delete_permanently(&b.id).await.unwrap();
    assert!(repo.find_by_id(&b.id).await.unwrap().is_none());
    let err = repo.delete_permanently(&b.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

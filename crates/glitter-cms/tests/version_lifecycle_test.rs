//! Draft/publish lifecycle and block edits

mod common;

use common::*;
use glitter_cms::prelude::*;
use rstest::rstest;
use serde_json::json;

fn columns_of(site: &GlitterSite, version: VersionId) -> Vec<(String, u32, ContentBlockId)> {
	site.block_store()
		.blocks_for_version(version)
		.unwrap()
		.into_iter()
		.map(|b| (b.column, b.position, b.id))
		.collect()
}

#[rstest]
fn test_start_editing_reuses_existing_draft() {
	let site = site();

	let first = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let second = site.versions().start_editing(&page(), EDITOR, "wide").unwrap();

	assert_eq!(first.id, second.id);
	assert!(first.is_draft());
	assert_eq!(second.template_name, "default");
}

#[rstest]
fn test_start_editing_requires_permission() {
	let site = site();

	let err = site
		.versions()
		.start_editing(&page(), VISITOR, "default")
		.unwrap_err();

	assert!(matches!(err, CmsError::PermissionDenied(_)));
}

#[rstest]
fn test_start_editing_rejects_layout_not_offered() {
	let site = site();

	let unknown = site.versions().start_editing(&page(), EDITOR, "missing").unwrap_err();
	let restricted = site.versions().start_editing(&page(), EDITOR, "article").unwrap_err();

	assert!(matches!(unknown, CmsError::UnknownLayout(_)));
	assert!(matches!(restricted, CmsError::UnknownLayout(_)));
}

#[rstest]
fn test_new_draft_clones_latest_published() {
	// Arrange
	let site = site();
	let original = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let block = add_text(&site, &original, "sidebar", "kept");
	add_text(&site, &original, "main_content", "body");
	let published = site.versions().publish(original.id, EDITOR).unwrap();

	// Act
	let draft = site
		.versions()
		.start_editing(&page(), OTHER_EDITOR, "wide")
		.unwrap();

	// Assert
	assert_ne!(draft.id, published.id);
	assert_eq!(draft.owner, OTHER_EDITOR);
	assert_eq!(draft.template_name, "default");
	let cloned = site.block_store().blocks_for_version(draft.id).unwrap();
	let layout: Vec<(&str, u32)> = cloned.iter().map(|b| (b.column.as_str(), b.position)).collect();
	assert_eq!(layout, vec![("main_content", 1), ("sidebar", 1)]);

	let copy = cloned.iter().find(|b| b.column == "sidebar").unwrap();
	assert_ne!(copy.object_id, block.object_id);
	let data = site
		.payload_store()
		.get_payload(&copy.content_type, copy.object_id.unwrap())
		.unwrap();
	assert_eq!(data, Some(json!({ "content": "kept" })));
}

#[rstest]
fn test_publish_assigns_increasing_numbers() {
	// Arrange
	let site = site();
	let first = site.versions().start_editing(&page(), EDITOR, "default").unwrap();

	// Act
	let first = site.versions().publish(first.id, EDITOR).unwrap();
	let second = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let second = site.versions().publish(second.id, EDITOR).unwrap();

	// Assert
	assert_eq!(first.version_number, Some(1));
	assert_eq!(second.version_number, Some(2));
	assert!(second.modified > first.modified);
	assert_eq!(
		site.versions().latest_published(&page()).unwrap().map(|v| v.id),
		Some(second.id)
	);
	assert_eq!(site.versions().current_draft(&page(), EDITOR).unwrap(), None);
}

#[rstest]
fn test_publish_twice_is_rejected() {
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	site.versions().publish(version.id, EDITOR).unwrap();

	let err = site.versions().publish(version.id, EDITOR).unwrap_err();

	assert!(matches!(err, CmsError::PublishedVersion(id) if id == version.id));
}

#[rstest]
fn test_publish_requires_publish_permission() {
	let site = site();
	let version = site
		.versions()
		.start_editing(&page(), OTHER_EDITOR, "default")
		.unwrap();

	let err = site.versions().publish(version.id, OTHER_EDITOR).unwrap_err();

	assert!(matches!(err, CmsError::PermissionDenied(_)));
}

#[rstest]
fn test_published_version_is_immutable() {
	// Arrange
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let block = add_text(&site, &version, "main_content", "frozen");
	site.versions().publish(version.id, EDITOR).unwrap();

	// Act
	let add = site
		.versions()
		.add_block(version.id, EDITOR, "main_content", TEXT, None)
		.unwrap_err();
	let delete = site.versions().delete_block(block.id, EDITOR).unwrap_err();
	let template = site
		.versions()
		.change_template(version.id, EDITOR, "wide")
		.unwrap_err();

	// Assert
	for err in [add, delete, template] {
		assert!(matches!(err, CmsError::PublishedVersion(_)));
		assert_eq!(err.status_code(), 403);
	}
}

#[rstest]
fn test_other_editors_draft_is_off_limits() {
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();

	let err = site
		.versions()
		.add_block(version.id, OTHER_EDITOR, "main_content", TEXT, None)
		.unwrap_err();

	assert!(matches!(err, CmsError::PermissionDenied(_)));
}

#[rstest]
#[case("footer", TEXT)]
#[case("main_content", "glitter_video.Video")]
fn test_add_block_validates_column_and_type(#[case] column: &str, #[case] type_tag: &str) {
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();

	let err = site
		.versions()
		.add_block(version.id, EDITOR, column, type_tag, None)
		.unwrap_err();

	assert_eq!(err.status_code(), 400);
	assert!(matches!(
		err,
		CmsError::UnknownColumn(_) | CmsError::UnknownBlockType(_)
	));
}

#[rstest]
fn test_add_block_at_position_shifts_siblings() {
	// Arrange
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let a = add_text(&site, &version, "main_content", "a");
	let b = add_text(&site, &version, "main_content", "b");

	// Act
	let inserted = site
		.versions()
		.add_block(version.id, EDITOR, "main_content", HTML, Some(1))
		.unwrap();

	// Assert
	assert_eq!(
		columns_of(&site, version.id),
		vec![
			("main_content".to_string(), 1, inserted.id),
			("main_content".to_string(), 2, a.id),
			("main_content".to_string(), 3, b.id),
		]
	);
}

#[rstest]
fn test_block_edits_touch_version() {
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();

	add_text(&site, &version, "main_content", "a");

	let touched = site.version_store().get_version(version.id).unwrap();
	assert!(touched.modified > version.modified);
}

#[rstest]
#[case(MoveBlock::Top, 2, vec![2, 0, 1])]
#[case(MoveBlock::Up, 1, vec![1, 0, 2])]
#[case(MoveBlock::Down, 0, vec![1, 0, 2])]
#[case(MoveBlock::Bottom, 0, vec![1, 2, 0])]
#[case(MoveBlock::Up, 0, vec![0, 1, 2])]
fn test_move_block(#[case] direction: MoveBlock, #[case] moved: usize, #[case] expected: Vec<usize>) {
	// Arrange
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let blocks: Vec<ContentBlock> = ["a", "b", "c"]
		.iter()
		.map(|c| add_text(&site, &version, "main_content", c))
		.collect();

	// Act
	let column = site
		.versions()
		.move_block(blocks[moved].id, EDITOR, direction)
		.unwrap();

	// Assert
	let ids: Vec<ContentBlockId> = column.iter().map(|b| b.id).collect();
	let expected_ids: Vec<ContentBlockId> = expected.iter().map(|i| blocks[*i].id).collect();
	assert_eq!(ids, expected_ids);
	let positions: Vec<u32> = column.iter().map(|b| b.position).collect();
	assert_eq!(positions, vec![1, 2, 3]);
}

#[rstest]
fn test_change_column_appends_and_closes_gap() {
	// Arrange
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let a = add_text(&site, &version, "main_content", "a");
	let b = add_text(&site, &version, "main_content", "b");
	let s = add_text(&site, &version, "sidebar", "s");

	// Act
	let moved = site.versions().change_column(a.id, EDITOR, "sidebar").unwrap();

	// Assert
	assert_eq!(moved.column, "sidebar");
	assert_eq!(
		columns_of(&site, version.id),
		vec![
			("main_content".to_string(), 1, b.id),
			("sidebar".to_string(), 1, s.id),
			("sidebar".to_string(), 2, a.id),
		]
	);
}

#[rstest]
fn test_change_column_rejects_undeclared_column() {
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let a = add_text(&site, &version, "main_content", "a");

	let err = site.versions().change_column(a.id, EDITOR, "footer").unwrap_err();

	assert!(matches!(err, CmsError::UnknownColumn(_)));
}

#[rstest]
fn test_delete_block_removes_payload_and_renumbers() {
	// Arrange
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let a = add_text(&site, &version, "main_content", "a");
	let b = add_text(&site, &version, "main_content", "b");

	// Act
	let removed = site.versions().delete_block(a.id, EDITOR).unwrap();

	// Assert
	assert_eq!(removed.id, a.id);
	assert_eq!(
		columns_of(&site, version.id),
		vec![("main_content".to_string(), 1, b.id)]
	);
	let payload = site
		.payload_store()
		.get_payload(&a.content_type, a.object_id.unwrap())
		.unwrap();
	assert_eq!(payload, None);
	assert!(matches!(
		site.block_store().get_content_block(a.id),
		Err(CmsError::ContentBlockNotFound(_))
	));
}

#[rstest]
fn test_change_template() {
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();

	let changed = site.versions().change_template(version.id, EDITOR, "wide").unwrap();
	let restricted = site
		.versions()
		.change_template(version.id, EDITOR, "article")
		.unwrap_err();

	assert_eq!(changed.template_name, "wide");
	assert!(changed.modified > version.modified);
	assert!(matches!(restricted, CmsError::UnknownLayout(_)));
}

#[rstest]
fn test_delete_empty_blocks() {
	// Arrange
	let site = site();
	let version = site.versions().start_editing(&page(), EDITOR, "default").unwrap();
	let admin = site.block_admin();
	let mut ids = Vec::new();
	for content in ["", "<p>kept</p>", ""] {
		let block = site
			.versions()
			.add_block(version.id, EDITOR, "main_content", HTML, None)
			.unwrap();
		admin
			.save_payload(EDITOR, block.id, json!({ "content": content }))
			.unwrap();
		ids.push(block.id);
	}
	let text = add_text(&site, &version, "main_content", "");

	// Act
	let removed = site.versions().delete_empty_blocks(HTML, "content").unwrap();

	// Assert
	assert_eq!(removed, 2);
	assert_eq!(
		columns_of(&site, version.id),
		vec![
			("main_content".to_string(), 1, ids[1]),
			("main_content".to_string(), 2, text.id),
		]
	);
}

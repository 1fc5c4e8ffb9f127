//! Repository composition behavior over mock capability implementations:
//! unbound capabilities refuse cleanly, and create mints an identifier when
//! the payload arrives without one.

use async_trait::async_trait;
use repogen::page::{build_page, Page, PageRequest, TextCursor};
use repogen::repo::{Keyed, OpContext, Reader, Repository, UuidIdSource, Writer};
use repogen::Error;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq)]
struct Note {
    id: String,
    body: String,
}

#[derive(Clone, Debug)]
struct CreateNote {
    id: String,
    body: String,
}

impl Keyed for CreateNote {
    fn key_is_empty(&self) -> bool {
        self.id.is_empty()
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }
}

struct StaticReader {
    rows: Vec<Note>,
}

#[async_trait]
impl Reader<String, Note, ()> for StaticReader {
    async fn get(&self, _ctx: &OpContext, id: &String, _filter: Option<&()>) -> Result<Note, Error> {
        self.rows
            .iter()
            .find(|n| &n.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Note".to_string()))
    }

    async fn list(
        &self,
        _ctx: &OpContext,
        _filter: Option<&()>,
        _order: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Note>, Error> {
        build_page(self.rows.clone(), page, |n| {
            TextCursor::new(n.id.clone(), n.id.clone())
        })
    }
}

/// Honors the cursor protocol: resumes after the remembered key and fetches
/// one probe row past the limit, the way a generated store does.
struct KeysetReader {
    rows: Vec<Note>,
}

#[async_trait]
impl Reader<String, Note, ()> for KeysetReader {
    async fn get(&self, _ctx: &OpContext, id: &String, _filter: Option<&()>) -> Result<Note, Error> {
        self.rows
            .iter()
            .find(|n| &n.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Note".to_string()))
    }

    async fn list(
        &self,
        _ctx: &OpContext,
        _filter: Option<&()>,
        _order: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Note>, Error> {
        let resume = match page.cursor.as_deref() {
            Some(token) => TextCursor::<String>::decode(token)?.map(|c| c.key),
            None => None,
        };
        let rows: Vec<Note> = self
            .rows
            .iter()
            .filter(|n| resume.as_deref().map_or(true, |k| n.id.as_str() > k))
            .take(page.limit as usize + 1)
            .cloned()
            .collect();
        build_page(rows, page, |n| {
            TextCursor::new(n.id.clone(), n.id.clone())
        })
    }
}

struct CapturingWriter {
    seen: Mutex<Option<CreateNote>>,
}

#[async_trait]
impl Writer<CreateNote, Note> for CapturingWriter {
    async fn create(&self, _ctx: &OpContext, payload: CreateNote) -> Result<Note, Error> {
        let note = Note {
            id: payload.id.clone(),
            body: payload.body.clone(),
        };
        *self.seen.lock().unwrap() = Some(payload);
        Ok(note)
    }
}

fn reader_only() -> Repository<String, Note, CreateNote, (), ()> {
    Repository::builder()
        .reader(Arc::new(StaticReader {
            rows: vec![
                Note {
                    id: "n1".to_string(),
                    body: "first".to_string(),
                },
                Note {
                    id: "n2".to_string(),
                    body: "second".to_string(),
                },
            ],
        }))
        .build()
}

#[tokio::test]
async fn bound_capabilities_serve() {
    let repo = reader_only();
    let ctx = OpContext::background();
    let note = repo.get(&ctx, &"n1".to_string(), None).await.unwrap();
    assert_eq!(note.body, "first");
    let page = repo
        .list(&ctx, None, None, &PageRequest::first_page())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(!page.info.has_next);
}

#[tokio::test]
async fn following_next_cursor_visits_every_row_exactly_once() {
    let rows: Vec<Note> = (0..7)
        .map(|i| Note {
            id: format!("n{i}"),
            body: format!("body {i}"),
        })
        .collect();
    let repo: Repository<String, Note, CreateNote, (), ()> = Repository::builder()
        .reader(Arc::new(KeysetReader { rows: rows.clone() }))
        .build();
    let ctx = OpContext::background();

    let mut seen = Vec::new();
    let mut req = PageRequest::parse(Some("3"), None).unwrap();
    loop {
        let page = repo.list(&ctx, None, None, &req).await.unwrap();
        seen.extend(page.items.iter().map(|n| n.id.clone()));
        if !page.info.has_next {
            assert!(page.info.next_cursor.is_none());
            break;
        }
        req = PageRequest {
            limit: req.limit,
            cursor: page.info.next_cursor.clone(),
        };
    }
    let expected: Vec<String> = rows.iter().map(|n| n.id.clone()).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn walk_ends_cleanly_on_an_exact_page_multiple() {
    let rows: Vec<Note> = (0..6)
        .map(|i| Note {
            id: format!("n{i}"),
            body: String::new(),
        })
        .collect();
    let repo: Repository<String, Note, CreateNote, (), ()> = Repository::builder()
        .reader(Arc::new(KeysetReader { rows }))
        .build();
    let ctx = OpContext::background();

    let first = repo
        .list(&ctx, None, None, &PageRequest::parse(Some("3"), None).unwrap())
        .await
        .unwrap();
    assert!(first.info.has_next);
    let second = repo
        .list(
            &ctx,
            None,
            None,
            &PageRequest {
                limit: 3,
                cursor: first.info.next_cursor.clone(),
            },
        )
        .await
        .unwrap();
    assert_eq!(second.info.page_total, 3);
    assert!(!second.info.has_next);
    assert!(second.info.next_cursor.is_none());
}

#[tokio::test]
async fn unbound_capabilities_refuse_by_operation_name() {
    let repo = reader_only();
    let ctx = OpContext::background();
    let payload = CreateNote {
        id: String::new(),
        body: "x".to_string(),
    };
    assert!(matches!(
        repo.create(&ctx, payload).await,
        Err(Error::Unsupported("create"))
    ));
    assert!(matches!(
        repo.update(&ctx, &"n1".to_string(), ()).await,
        Err(Error::Unsupported("update"))
    ));
    assert!(matches!(
        repo.delete(&ctx, &"n1".to_string()).await,
        Err(Error::Unsupported("delete"))
    ));
    assert!(matches!(
        repo.archive(&ctx, &"n1".to_string()).await,
        Err(Error::Unsupported("archive"))
    ));
}

#[tokio::test]
async fn create_mints_an_id_when_the_payload_has_none() {
    let writer = Arc::new(CapturingWriter {
        seen: Mutex::new(None),
    });
    let repo: Repository<String, Note, CreateNote, (), ()> = Repository::builder()
        .writer(writer.clone())
        .id_source(Arc::new(UuidIdSource))
        .build();
    let ctx = OpContext::background();

    let created = repo
        .create(
            &ctx,
            CreateNote {
                id: String::new(),
                body: "minted".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.id.len(), 36);
    assert!(created
        .id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-'));
    let seen = writer.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.id, created.id);
}

#[tokio::test]
async fn create_keeps_a_caller_supplied_id() {
    let writer = Arc::new(CapturingWriter {
        seen: Mutex::new(None),
    });
    let repo: Repository<String, Note, CreateNote, (), ()> = Repository::builder()
        .writer(writer)
        .id_source(Arc::new(UuidIdSource))
        .build();
    let ctx = OpContext::background();

    let created = repo
        .create(
            &ctx,
            CreateNote {
                id: "chosen".to_string(),
                body: "kept".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.id, "chosen");
}

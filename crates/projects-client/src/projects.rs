//! Board operations for one repository.

use crate::config::ClientConfig;
use crate::edit::{self, Board, EditOutcome, EditRequest, FieldMap, ItemRef};
use crate::error::{ClientError, Result};
use crate::graphql::{execute_as, variables, GraphQlClient};
use crate::http::HttpTransport;
use crate::queries;
use projects_core::{Connection, FieldAssignments, Project, ProjectUpdate, Repository};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Identifies a board found by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub number: u32,
    pub url: String,
    #[serde(default)]
    pub public: bool,
}

/// Which boards [`Projects::list_projects`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl StateFilter {
    const fn matches(self, project: &Project) -> bool {
        match self {
            Self::Open => !project.closed,
            Self::Closed => project.closed,
            Self::All => true,
        }
    }
}

/// Options for [`Projects::clone_project`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    pub number: u32,
    pub title: String,
    /// Copy draft issues too.
    pub drafts: bool,
    /// Properties to set on the copy. `public` defaults to the source
    /// board's visibility when the source is public.
    pub update: ProjectUpdate,
}

#[derive(Deserialize)]
struct ProjectIdData {
    viewer: Option<Viewer>,
    repository: Option<RepositoryProject>,
}

#[derive(Deserialize)]
struct Viewer {
    id: String,
}

#[derive(Deserialize)]
struct RepositoryProject {
    #[serde(rename = "projectV2")]
    project: Option<ProjectRef>,
}

#[derive(Deserialize)]
struct OwnerProjectData {
    #[serde(rename = "repositoryOwner")]
    owner: Option<OwnerNode>,
}

#[derive(Deserialize)]
struct OwnerNode {
    #[serde(rename = "type")]
    owner_type: String,
    repository: Option<Node>,
    #[serde(default, rename = "projectV2")]
    project: Option<ProjectRef>,
}

#[derive(Deserialize)]
struct Node {
    id: String,
}

#[derive(Deserialize)]
struct CopyData {
    #[serde(rename = "copyProjectV2")]
    copy: CopyNode,
}

#[derive(Deserialize)]
struct CopyNode {
    #[serde(rename = "projectV2")]
    project: ProjectRef,
}

#[derive(Deserialize)]
struct ListData {
    repository: Option<RepositoryProjects>,
}

#[derive(Deserialize)]
struct RepositoryProjects {
    #[serde(default, rename = "projectsV2")]
    projects: Connection<Project>,
}

#[derive(Deserialize)]
struct ViewData {
    repository: Option<RepositoryView>,
}

#[derive(Deserialize)]
struct RepositoryView {
    #[serde(rename = "projectV2")]
    project: Option<Project>,
}

/// Board operations scoped to one repository.
pub struct Projects {
    client: Arc<dyn GraphQlClient>,
    repository: Repository,
    config: ClientConfig,
}

impl std::fmt::Debug for Projects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projects")
            .field("repository", &self.repository)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Projects {
    /// Create a service over an existing client.
    #[must_use]
    pub fn new(client: Arc<dyn GraphQlClient>, repository: Repository, config: ClientConfig) -> Self {
        Self {
            client,
            repository,
            config,
        }
    }

    /// Create a service talking HTTPS to the repository's host.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn connect(repository: Repository, config: ClientConfig, token: &str) -> Result<Self> {
        let endpoint = config.graphql_endpoint(&repository.host);
        let transport = HttpTransport::new(endpoint, token)?;
        debug!(endpoint = transport.endpoint(), repo = %repository, "Connected");
        Ok(Self::new(Arc::new(transport), repository, config))
    }

    fn board(&self, project: &ProjectRef) -> Board {
        Board::new(self.repository.clone(), project.number, &project.id)
    }

    /// Find board `number` on the repository.
    ///
    /// A board owned by the repository's user or organization but not yet
    /// linked to the repository is linked to it.
    ///
    /// # Errors
    /// Returns `ClientError::ProjectNotFound` if the owner has no such board,
    /// or `ClientError::LinkFailed` if linking failed.
    pub async fn find_project(&self, number: u32) -> Result<ProjectRef> {
        let vars = self.project_variables(number);
        match execute_as::<ProjectIdData>(self.client.as_ref(), queries::PROJECT_ID, vars.clone())
            .await
        {
            Ok(data) => {
                if let Some(project) = data.repository.and_then(|r| r.project) {
                    return Ok(project);
                }
            }
            Err(err) if err.has_graphql_type("NOT_FOUND") => {}
            Err(err) => return Err(err),
        }

        debug!(number, repo = %self.repository, "Board not linked, looking up owner");
        let data: OwnerProjectData =
            execute_as(self.client.as_ref(), queries::OWNER_PROJECT_ID, vars).await?;

        let owner = data.owner;
        let owner_type = owner
            .as_ref()
            .map_or_else(|| "owner".to_string(), |o| o.owner_type.clone());

        let Some(OwnerNode {
            repository: Some(repository),
            project: Some(project),
            ..
        }) = owner
        else {
            return Err(ClientError::ProjectNotFound {
                number,
                owner_type,
                owner: self.repository.owner.clone(),
            });
        };

        self.client
            .execute(
                queries::LINK_PROJECT,
                variables(json!({ "projectId": project.id, "repositoryId": repository.id })),
            )
            .await
            .map_err(|source| ClientError::LinkFailed {
                number,
                repo: self.repository.to_string(),
                source: Box::new(source),
            })?;

        info!(number, repo = %self.repository, "Linked board to repository");
        Ok(project)
    }

    /// Send scalar property changes, if there are any.
    ///
    /// Returns whether an update was sent.
    ///
    /// # Errors
    /// Returns remote errors as is.
    pub async fn update_project(&self, project_id: &str, update: &ProjectUpdate) -> Result<bool> {
        if !update.has_changes() {
            return Ok(false);
        }

        let mut vars = variables(json!({ "id": project_id }));
        if let Some(title) = update.title.as_deref().filter(|t| !t.is_empty()) {
            vars.insert("title".to_string(), json!(title));
        }
        if let Some(description) = &update.description {
            vars.insert("description".to_string(), json!(description));
        }
        if let Some(body) = &update.body {
            vars.insert("body".to_string(), json!(body));
        }
        if let Some(public) = update.public {
            vars.insert("public".to_string(), json!(public));
        }

        self.client.execute(queries::UPDATE_PROJECT, vars).await?;
        debug!(project_id, "Updated board");
        Ok(true)
    }

    /// List the repository's boards, reading every page.
    ///
    /// # Errors
    /// Returns remote errors as is.
    pub async fn list_projects(
        &self,
        search: Option<&str>,
        state: StateFilter,
    ) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let data: ListData = execute_as(
                self.client.as_ref(),
                queries::LIST_PROJECTS,
                variables(json!({
                    "owner": self.repository.owner,
                    "name": self.repository.name,
                    "first": self.config.page_size,
                    "after": after,
                    "search": search.filter(|s| !s.is_empty()),
                })),
            )
            .await?;

            let page = data.repository.map(|r| r.projects).unwrap_or_default();
            projects.extend(page.nodes.into_iter().filter(|p| state.matches(p)));

            match page.page_info.next_cursor() {
                Some(cursor) => after = Some(cursor.to_string()),
                None => break,
            }
        }

        Ok(projects)
    }

    /// Read a board and the first page of its items.
    ///
    /// # Errors
    /// Returns `ClientError::ProjectNotFound` if the repository has no such board.
    pub async fn view_project(&self, number: u32) -> Result<Project> {
        let mut vars = self.project_variables(number);
        vars.insert("first".to_string(), json!(self.config.page_size));

        let data: ViewData = execute_as(self.client.as_ref(), queries::VIEW_PROJECT, vars).await?;
        data.repository
            .and_then(|r| r.project)
            .ok_or_else(|| self.not_found(number))
    }

    /// Copy a board to the viewer's account.
    ///
    /// # Errors
    /// Returns `ClientError::ProjectNotFound` if the source board does not exist.
    pub async fn clone_project(&self, options: &CloneOptions) -> Result<ProjectRef> {
        let data: ProjectIdData = execute_as(
            self.client.as_ref(),
            queries::PROJECT_ID,
            self.project_variables(options.number),
        )
        .await?;

        let source = data
            .repository
            .and_then(|r| r.project)
            .ok_or_else(|| self.not_found(options.number))?;
        let owner_id = data
            .viewer
            .map(|v| v.id)
            .ok_or_else(|| ClientError::InvalidRequest("viewer id not returned".to_string()))?;

        let copy: CopyData = execute_as(
            self.client.as_ref(),
            queries::COPY_PROJECT,
            variables(json!({
                "ownerId": owner_id,
                "projectId": source.id,
                "title": options.title,
                "drafts": options.drafts,
            })),
        )
        .await?;
        let cloned = copy.copy.project;
        info!(source = %source.url, url = %cloned.url, "Cloned board");

        // The title was set by the copy itself.
        let mut update = ProjectUpdate {
            title: None,
            ..options.update.clone()
        };
        if update.public.is_none() && source.public {
            update.public = Some(true);
        }
        self.update_project(&cloned.id, &update).await?;

        Ok(cloned)
    }

    /// Resolve field assignments against a board's schema.
    ///
    /// # Errors
    /// See [`edit::resolve_fields`].
    pub async fn resolve_fields(
        &self,
        project: &ProjectRef,
        assignments: &FieldAssignments,
    ) -> Result<FieldMap> {
        edit::resolve_fields(
            self.client.as_ref(),
            &self.board(project),
            assignments,
            self.config.page_size,
        )
        .await
    }

    /// Add issues or pull requests to a board and set `fields` on each.
    ///
    /// # Errors
    /// See [`edit::add_items`].
    pub async fn add_items(
        &self,
        project: &ProjectRef,
        numbers: &[u64],
        fields: FieldMap,
    ) -> Result<Vec<ItemRef>> {
        edit::add_items(
            Arc::clone(&self.client),
            Arc::new(self.board(project)),
            numbers,
            Arc::new(fields),
            self.config.worker_count,
        )
        .await
    }

    /// Remove issues or pull requests from a board.
    ///
    /// # Errors
    /// See [`edit::remove_items`].
    pub async fn remove_items(&self, project: &ProjectRef, numbers: &[u64]) -> Result<Vec<ItemRef>> {
        edit::remove_items(
            self.client.as_ref(),
            &self.board(project),
            numbers,
            self.config.page_size,
        )
        .await
    }

    /// Apply an edit: scalar properties first, then additions, then removals.
    ///
    /// Fields are resolved before any item is added, so an unknown field or
    /// bad value leaves the board's items untouched.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidRequest` if fields are given without items
    /// to add, otherwise the first error of whichever step failed.
    pub async fn edit(&self, request: &EditRequest) -> Result<EditOutcome> {
        if !request.fields.is_empty() && request.add.is_empty() {
            return Err(ClientError::InvalidRequest(
                "--field requires --add-issue".to_string(),
            ));
        }

        let project = self.find_project(request.number).await?;
        let updated = self.update_project(&project.id, &request.update).await?;

        let mut added = Vec::new();
        if !request.add.is_empty() {
            let fields = self.resolve_fields(&project, &request.fields).await?;
            added = self.add_items(&project, &request.add, fields).await?;
            info!(number = project.number, count = added.len(), "Added items");
        }

        let mut removed = Vec::new();
        if !request.remove.is_empty() {
            removed = self.remove_items(&project, &request.remove).await?;
            info!(number = project.number, count = removed.len(), "Removed items");
        }

        Ok(EditOutcome {
            url: project.url,
            updated,
            added,
            removed,
        })
    }

    fn project_variables(&self, number: u32) -> crate::graphql::Variables {
        variables(json!({
            "owner": self.repository.owner,
            "name": self.repository.name,
            "number": number,
        }))
    }

    fn not_found(&self, number: u32) -> ClientError {
        ClientError::ProjectNotFound {
            number,
            owner_type: "repository".to_string(),
            owner: self.repository.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{remote_error, unexpected, FakeClient};
    use pretty_assertions::assert_eq;
    use projects_core::ItemType;
    use serde_json::Value;

    fn projects(client: FakeClient) -> (Arc<FakeClient>, Projects) {
        let client = Arc::new(client);
        let projects = Projects::new(
            client.clone(),
            Repository::new("heaths", "gh-projects"),
            ClientConfig::default(),
        );
        (client, projects)
    }

    fn linked(public: bool) -> Value {
        json!({
            "viewer": { "id": "U_1" },
            "repository": {
                "projectV2": {
                    "id": "PVT_1",
                    "number": 1,
                    "url": "https://github.com/users/heaths/projects/1",
                    "public": public,
                }
            }
        })
    }

    fn unlinked(op: &str) -> crate::error::Result<Value> {
        match op {
            "RepositoryProjectV2Id" => Err(remote_error(
                "NOT_FOUND",
                "Could not resolve to a ProjectV2 with the number 1.",
            )),
            "RepositoryOwnerProjectV2Id" => Ok(json!({
                "repositoryOwner": {
                    "type": "User",
                    "repository": { "id": "R_1" },
                    "projectV2": {
                        "id": "PVT_1",
                        "number": 1,
                        "url": "https://github.com/users/heaths/projects/1",
                        "public": false,
                    }
                }
            })),
            _ => Err(unexpected(op)),
        }
    }

    #[tokio::test]
    async fn test_find_linked_project() {
        let (client, projects) = projects(FakeClient::new(|op, _| match op {
            "RepositoryProjectV2Id" => Ok(linked(false)),
            _ => Err(unexpected(op)),
        }));

        let project = projects.find_project(1).await.unwrap();
        assert_eq!(project.id, "PVT_1");
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_find_project_links_owner_project() {
        let (client, projects) = projects(FakeClient::new(|op, _| match op {
            "LinkProjectV2ToRepository" => Ok(json!({
                "linkProjectV2ToRepository": { "repository": { "id": "R_1" } }
            })),
            _ => unlinked(op),
        }));

        let project = projects.find_project(1).await.unwrap();
        assert_eq!(project.id, "PVT_1");

        let links = client.calls_to("LinkProjectV2ToRepository");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].get("projectId"), Some(&json!("PVT_1")));
        assert_eq!(links[0].get("repositoryId"), Some(&json!("R_1")));
    }

    #[tokio::test]
    async fn test_find_project_link_failure() {
        let (_, projects) = projects(FakeClient::new(|op, _| match op {
            "LinkProjectV2ToRepository" => Err(remote_error("FORBIDDEN", "denied")),
            _ => unlinked(op),
        }));

        let err = projects.find_project(1).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"failed to link project #1 to "heaths/gh-projects": GraphQL: denied"#
        );
    }

    #[tokio::test]
    async fn test_find_project_not_found() {
        let (_, projects) = projects(FakeClient::new(|op, _| match op {
            "RepositoryProjectV2Id" => Ok(json!({ "viewer": { "id": "U_1" }, "repository": { "projectV2": null } })),
            "RepositoryOwnerProjectV2Id" => Ok(json!({
                "repositoryOwner": { "type": "Organization", "repository": { "id": "R_1" }, "projectV2": null }
            })),
            _ => Err(unexpected(op)),
        }));

        let err = projects.find_project(7).await.unwrap_err();
        assert_eq!(err.to_string(), r#"project #7 not found for Organization "heaths""#);
    }

    #[tokio::test]
    async fn test_update_project_only_when_changed() {
        let (client, projects) = projects(FakeClient::new(|op, _| match op {
            "UpdateProjectV2" => Ok(json!({ "updateProjectV2": { "projectV2": { "url": "u" } } })),
            _ => Err(unexpected(op)),
        }));

        let empty_title = ProjectUpdate {
            title: Some(String::new()),
            ..ProjectUpdate::default()
        };
        assert!(!projects.update_project("PVT_1", &empty_title).await.unwrap());
        assert!(client.calls().is_empty());

        let update = ProjectUpdate {
            description: Some("short".to_string()),
            public: Some(false),
            ..ProjectUpdate::default()
        };
        assert!(projects.update_project("PVT_1", &update).await.unwrap());

        let calls = client.calls_to("UpdateProjectV2");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get("description"), Some(&json!("short")));
        assert_eq!(calls[0].get("public"), Some(&json!(false)));
        assert_eq!(calls[0].get("title"), None);
    }

    #[tokio::test]
    async fn test_list_projects_filters_state() {
        let (client, projects) = projects(FakeClient::new(|op, vars| match op {
            "RepositoryProjectsV2" => {
                let after = vars.get("after").and_then(Value::as_str);
                let (nodes, next) = match after {
                    None => (
                        json!([{ "id": "P1", "number": 1, "title": "One", "closed": false }]),
                        Some("c1"),
                    ),
                    _ => (
                        json!([{ "id": "P2", "number": 2, "title": "Two", "closed": true }]),
                        None,
                    ),
                };
                Ok(json!({
                    "repository": {
                        "projectsV2": {
                            "totalCount": 2,
                            "nodes": nodes,
                            "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
                        }
                    }
                }))
            }
            _ => Err(unexpected(op)),
        }));

        let open = projects.list_projects(None, StateFilter::Open).await.unwrap();
        assert_eq!(open.iter().map(|p| p.number).collect::<Vec<_>>(), [1]);

        let closed = projects.list_projects(None, StateFilter::Closed).await.unwrap();
        assert_eq!(closed.iter().map(|p| p.number).collect::<Vec<_>>(), [2]);

        let all = projects.list_projects(Some("t"), StateFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(client.calls_to("RepositoryProjectsV2")[4].get("search"), Some(&json!("t")));
    }

    #[tokio::test]
    async fn test_view_project_with_items() {
        let (client, projects) = projects(FakeClient::new(|op, vars| match (op, vars.get("number")) {
            ("RepositoryProjectV2", Some(n)) if n == &json!(1) => Ok(json!({
                "repository": {
                    "projectV2": {
                        "id": "PVT_1",
                        "number": 1,
                        "title": "Roadmap",
                        "readme": "Plans",
                        "creator": { "login": "heaths" },
                        "createdAt": "2022-06-01T12:00:00Z",
                        "items": {
                            "totalCount": 1,
                            "nodes": [{
                                "id": "I_2",
                                "type": "ISSUE",
                                "content": { "number": 2, "title": "Docs", "state": "OPEN" }
                            }],
                            "pageInfo": { "hasNextPage": false, "endCursor": null }
                        }
                    }
                }
            })),
            ("RepositoryProjectV2", _) => Ok(json!({ "repository": { "projectV2": null } })),
            _ => Err(unexpected(op)),
        }));

        let project = projects.view_project(1).await.unwrap();
        assert_eq!(project.title, "Roadmap");
        assert_eq!(project.body.as_deref(), Some("Plans"));
        let items = project.items.unwrap();
        assert_eq!(items.total_count, 1);
        assert_eq!(items.nodes[0].content_number(), Some(2));
        assert_eq!(items.nodes[0].item_type, Some(ItemType::Issue));
        assert_eq!(
            client.calls_to("RepositoryProjectV2")[0].get("first"),
            Some(&json!(crate::DEFAULT_PAGE_SIZE))
        );

        let err = projects.view_project(7).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"project #7 not found for repository "heaths/gh-projects""#
        );
    }

    #[tokio::test]
    async fn test_clone_copies_public_visibility() {
        let (client, projects) = projects(FakeClient::new(|op, _| match op {
            "RepositoryProjectV2Id" => Ok(linked(true)),
            "CopyProjectV2" => Ok(json!({
                "copyProjectV2": {
                    "projectV2": { "id": "PVT_2", "number": 2, "url": "https://github.com/users/heaths/projects/2" }
                }
            })),
            "UpdateProjectV2" => Ok(json!({ "updateProjectV2": { "projectV2": { "url": "u" } } })),
            _ => Err(unexpected(op)),
        }));

        let cloned = projects
            .clone_project(&CloneOptions {
                number: 1,
                title: "Copy".to_string(),
                ..CloneOptions::default()
            })
            .await
            .unwrap();
        assert_eq!(cloned.number, 2);

        let copies = client.calls_to("CopyProjectV2");
        assert_eq!(copies[0].get("ownerId"), Some(&json!("U_1")));
        assert_eq!(copies[0].get("title"), Some(&json!("Copy")));

        let updates = client.calls_to("UpdateProjectV2");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].get("id"), Some(&json!("PVT_2")));
        assert_eq!(updates[0].get("public"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_clone_private_sends_no_update() {
        let (client, projects) = projects(FakeClient::new(|op, _| match op {
            "RepositoryProjectV2Id" => Ok(linked(false)),
            "CopyProjectV2" => Ok(json!({
                "copyProjectV2": { "projectV2": { "id": "PVT_2", "number": 2, "url": "u" } }
            })),
            _ => Err(unexpected(op)),
        }));

        projects
            .clone_project(&CloneOptions {
                number: 1,
                title: "Copy".to_string(),
                ..CloneOptions::default()
            })
            .await
            .unwrap();

        assert!(client.calls_to("UpdateProjectV2").is_empty());
    }

    #[tokio::test]
    async fn test_edit_fields_require_additions() {
        let (client, projects) = projects(FakeClient::new(|op, _| Err(unexpected(op))));
        let request = EditRequest::new(1).with_fields([("Status", "Done")].into_iter().collect());

        let err = projects.edit(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "--field requires --add-issue");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_unknown_field_adds_nothing() {
        let (client, projects) = projects(FakeClient::new(|op, _| match op {
            "RepositoryProjectV2Id" => Ok(linked(false)),
            "RepositoryProjectV2Fields" => Ok(crate::testing::fields_page(json!([]), None)),
            _ => Err(unexpected(op)),
        }));
        let request = EditRequest::new(1)
            .with_add([2, 3])
            .with_fields([("Priority", "High")].into_iter().collect());

        let err = projects.edit(&request).await.unwrap_err();
        assert_eq!(err.to_string(), r#"field "Priority" not defined"#);
        assert!(client.calls_to("RepositoryIssueOrPullRequestId").is_empty());
        assert!(client.calls_to("AddProjectV2ItemById").is_empty());
    }
}

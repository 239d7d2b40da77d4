//! GraphQL documents sent to the remote API.

/// Look up a board linked to a repository, along with the viewer's id.
pub const PROJECT_ID: &str = r"
query RepositoryProjectV2Id($owner: String!, $name: String!, $number: Int!) {
  viewer {
    id
  }
  repository(owner: $owner, name: $name) {
    projectV2(number: $number) {
      id
      number
      url
      public
    }
  }
}
";

/// Look up a board on the repository's owner (user or organization).
pub const OWNER_PROJECT_ID: &str = r"
query RepositoryOwnerProjectV2Id($owner: String!, $name: String!, $number: Int!) {
  repositoryOwner(login: $owner) {
    type: __typename
    repository(name: $name) {
      id
    }
    ... on ProjectV2Owner {
      projectV2(number: $number) {
        id
        number
        url
        public
      }
    }
  }
}
";

pub const LINK_PROJECT: &str = r"
mutation LinkProjectV2ToRepository($projectId: ID!, $repositoryId: ID!) {
  linkProjectV2ToRepository(input: {projectId: $projectId, repositoryId: $repositoryId}) {
    repository {
      id
    }
  }
}
";

pub const UPDATE_PROJECT: &str = r"
mutation UpdateProjectV2($id: ID!, $title: String, $description: String, $body: String, $public: Boolean) {
  updateProjectV2(
    input: {projectId: $id, title: $title, shortDescription: $description, readme: $body, public: $public}
  ) {
    projectV2 {
      url
    }
  }
}
";

pub const COPY_PROJECT: &str = r"
mutation CopyProjectV2($ownerId: ID!, $projectId: ID!, $title: String!, $drafts: Boolean = false) {
  copyProjectV2(
    input: {ownerId: $ownerId, projectId: $projectId, title: $title, includeDraftIssues: $drafts}
  ) {
    projectV2 {
      id
      number
      url
      public
    }
  }
}
";

pub const LIST_PROJECTS: &str = r"
query RepositoryProjectsV2($owner: String!, $name: String!, $first: Int!, $after: String, $search: String) {
  repository(owner: $owner, name: $name) {
    projectsV2(first: $first, after: $after, query: $search) {
      totalCount
      nodes {
        id
        number
        title
        description: shortDescription
        public
        closed
        url
        createdAt
        creator {
          login
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
";

pub const VIEW_PROJECT: &str = r"
query RepositoryProjectV2($owner: String!, $name: String!, $number: Int!, $first: Int!) {
  repository(owner: $owner, name: $name) {
    projectV2(number: $number) {
      id
      number
      title
      description: shortDescription
      body: readme
      public
      closed
      url
      createdAt
      creator {
        login
      }
      items(first: $first) {
        totalCount
        nodes {
          id
          type
          content {
            ... on DraftIssue {
              title
              createdAt
              creator {
                login
              }
            }
            ... on Issue {
              id
              number
              title
              state
              url
              createdAt
              creator: author {
                login
              }
            }
            ... on PullRequest {
              id
              number
              title
              state
              url
              createdAt
              creator: author {
                login
              }
            }
          }
        }
        pageInfo {
          hasNextPage
          endCursor
        }
      }
    }
  }
}
";

pub const PROJECT_FIELDS: &str = r"
query RepositoryProjectV2Fields($owner: String!, $name: String!, $number: Int!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    projectV2(number: $number) {
      fields(first: $first, after: $after) {
        nodes {
          ... on ProjectV2Field {
            id
            name
            dataType
          }
          ... on ProjectV2IterationField {
            id
            name
            dataType
            configuration {
              iterations {
                id
                name: title
              }
            }
          }
          ... on ProjectV2SingleSelectField {
            id
            name
            dataType
            options {
              id
              name
            }
          }
        }
        pageInfo {
          hasNextPage
          endCursor
        }
      }
    }
  }
}
";

pub const ISSUE_OR_PULL_REQUEST_ID: &str = r"
query RepositoryIssueOrPullRequestId($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issueOrPullRequest(number: $number) {
      ... on Issue {
        id
      }
      ... on PullRequest {
        id
      }
    }
  }
}
";

pub const ADD_ITEM: &str = r"
mutation AddProjectV2ItemById($id: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: {projectId: $id, contentId: $contentId}) {
    item {
      id
    }
  }
}
";

pub const UPDATE_ITEM_FIELD: &str = r"
mutation UpdateProjectV2ItemFieldValue($projectId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(
    input: {projectId: $projectId, itemId: $itemId, fieldId: $fieldId, value: $value}
  ) {
    projectV2Item {
      id
    }
  }
}
";

pub const PROJECT_ITEMS: &str = r"
query RepositoryProjectV2Items($owner: String!, $name: String!, $number: Int!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    projectV2(number: $number) {
      items(first: $first, after: $after) {
        totalCount
        nodes {
          id
          type
          content {
            ... on Issue {
              id
              number
            }
            ... on PullRequest {
              id
              number
            }
          }
        }
        pageInfo {
          hasNextPage
          endCursor
        }
      }
    }
  }
}
";

pub const DELETE_ITEM: &str = r"
mutation DeleteProjectV2Item($id: ID!, $itemId: ID!) {
  deleteProjectV2Item(input: {projectId: $id, itemId: $itemId}) {
    deletedItemId
  }
}
";

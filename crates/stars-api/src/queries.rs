//! GraphQL documents sent to the Stars API

pub(crate) const CREATE_CONTRIBUTIONS: &str = r#"mutation CreateContributions($data: [ContributionInput!]!) {
  createContributions(data: $data) {
    id
    __typename
  }
}"#;

pub(crate) const CREATE_CONTRIBUTION: &str = r#"mutation CreateContribution($data: ContributionInput!) {
  createContribution(data: $data) {
    id
    __typename
  }
}"#;

pub(crate) const UPDATE_CONTRIBUTION: &str = r#"mutation UpdateContribution($id: String!, $data: ContributionInput!) {
  updateContribution(id: $id, data: $data) {
    id
    title
    __typename
  }
}"#;

pub(crate) const DELETE_CONTRIBUTION: &str = r#"mutation DeleteContribution($id: String!) {
  deleteContribution(id: $id) {
    id
    __typename
  }
}"#;

pub(crate) const CREATE_LINK: &str = r#"mutation CreateLink($link: URL!, $platform: PlatformType!) {
  createLink(data: {link: $link, platform: $platform}) {
    id
    __typename
  }
}"#;

pub(crate) const UPDATE_LINK: &str = r#"mutation UpdateLink($id: String!, $link: URL!, $platform: PlatformType!) {
  updateLink(id: $id, data: {link: $link, platform: $platform}) {
    id
    link
    __typename
  }
}"#;

pub(crate) const DELETE_LINK: &str = r#"mutation DeleteLink($id: String!) {
  deleteLink(id: $id) {
    id
    __typename
  }
}"#;

pub(crate) const UPDATE_PROFILE: &str = r#"mutation UpdateProfile($data: NomineeProfileInput!) {
  updateProfile(data: $data) {
    id
    __typename
  }
}"#;

pub(crate) const USER_DATA: &str = r#"query UserData {
  loggedUser {
    id
    username
    email
    nominee {
      status
      avatar
      name
      bio
      country
      birthdate
      reason
      jobTitle
      company
      phoneNumber
      address
      state
      city
      zipcode
      links {
        id
        link
        platform
        __typename
      }
      contributions {
        id
        type
        date
        title
        url
        description
        __typename
      }
      __typename
    }
    __typename
  }
}"#;

pub(crate) const USER: &str = r#"query User {
  loggedUser {
    id
    username
    email
    nominee {
      status
      avatar
      name
      bio
      country
      birthdate
      reason
      jobTitle
      company
      phoneNumber
      address
      state
      city
      zipcode
      links {
        id
        link
        platform
        __typename
      }
      contributions {
        id
        type
        date
        title
        url
        description
        __typename
      }
      __typename
    }
    __typename
  }
}"#;

pub(crate) const GET_STARS: &str = r#"query GetStars($username: String!) {
  publicProfile(username: $username) {
    username
    contributions {
      id
      type
      date
      title
      url
      description
      __typename
    }
    __typename
  }
}"#;

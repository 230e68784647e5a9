use indexmap::IndexSet;
use serde::Serialize;

use chorus_core::Post;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkNode {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkLink {
    pub source: String,
    pub target: String,
}

/// Directed author graph: an edge from each reposting author to the author
/// they reposted from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepostNetwork {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
}

/// Build the repost network. Nodes and links keep first-seen order; repeated
/// links collapse into one.
pub fn repost_network(posts: &[Post]) -> RepostNetwork {
    let mut nodes: IndexSet<&str> = IndexSet::new();
    let mut links: IndexSet<(&str, &str)> = IndexSet::new();

    for post in posts {
        let Some(origin) = post.repost_of.as_deref() else {
            continue;
        };
        nodes.insert(post.author.as_str());
        nodes.insert(origin);
        links.insert((post.author.as_str(), origin));
    }

    RepostNetwork {
        nodes: nodes
            .into_iter()
            .map(|id| NetworkNode { id: id.to_string() })
            .collect(),
        links: links
            .into_iter()
            .map(|(source, target)| NetworkLink {
                source: source.to_string(),
                target: target.to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repost(author: &str, of: Option<&str>) -> Post {
        let mut p = Post::new("p", author, None, "t", "");
        p.repost_of = of.map(str::to_string);
        p
    }

    #[test]
    fn links_reposters_to_origin() {
        let posts = vec![
            repost("bob", Some("alice")),
            repost("carol", None),
            repost("dave", Some("alice")),
            repost("bob", Some("alice")),
        ];
        let net = repost_network(&posts);
        let ids: Vec<&str> = net.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["bob", "alice", "dave"]);
        assert_eq!(net.links.len(), 2);
        assert_eq!(net.links[1], NetworkLink { source: "dave".into(), target: "alice".into() });
    }

    #[test]
    fn no_reposts_no_graph() {
        assert_eq!(repost_network(&[repost("a", None)]), RepostNetwork::default());
    }
}

//! Algebraic properties of conditions and stub builders.

use proptest::prelude::*;
use stub_networking::condition::{Extension, Header, Host, Path, QueryParams, Scheme};
use stub_networking::{stub, Condition, Method, Request, Stub};

fn arb_request() -> impl Strategy<Value = Request> {
    (
        prop::sample::select(vec!["http", "https"]),
        prop::sample::select(vec!["a.example", "b.example"]),
        prop::sample::select(vec!["/", "/users", "/img/logo.png"]),
        prop::sample::select(vec!["", "?page=1", "?page=2&q", "?q=x"]),
        prop::sample::select(vec![Method::Get, Method::Post]),
        prop::option::of(prop::sample::select(vec!["application/json", "text/plain"])),
    )
        .prop_map(|(scheme, host, path, query, method, accept)| {
            let request = Request::new(method, format!("{}://{}{}{}", scheme, host, path, query));
            match accept {
                Some(accept) => request.with_header("Accept", accept),
                None => request,
            }
        })
}

fn arb_leaf() -> impl Strategy<Value = Condition> {
    prop_oneof![
        Just(Condition::Always),
        prop::sample::select(vec!["http", "https"]).prop_map(|s| Scheme::is(s)),
        prop::sample::select(vec!["a.example", "b.example"]).prop_map(|h| Host::is(h)),
        prop::sample::select(vec!["/", "/users"]).prop_map(|p| Path::is(p)),
        Just(Extension::is("png")),
        prop::sample::select(vec![Method::Get, Method::Post]).prop_map(|m| m.condition()),
        Just(QueryParams::contains([("page", None::<&str>)])),
        Just(QueryParams::contains([("page", Some("2"))])),
        Just(Header::contains("accept")),
        Just(Header::contains_value("Accept", "application/json")),
    ]
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    arb_leaf().prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l & r),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l | r),
            inner.prop_map(|c| !c),
        ]
    })
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Scheme,
    Host,
    Path,
    Method,
    Query,
    Header,
}

fn apply(stub: Stub, step: Step) -> Stub {
    match step {
        Step::Scheme => stub.scheme("https"),
        Step::Host => stub.host("a.example"),
        Step::Path => stub.path("/users"),
        Step::Method => stub.method(Method::Get),
        Step::Query => stub.query_names(["page"]),
        Step::Header => stub.header_value("accept", "application/json"),
    }
}

const STEPS: [Step; 6] = [
    Step::Scheme,
    Step::Host,
    Step::Path,
    Step::Method,
    Step::Query,
    Step::Header,
];

proptest! {
    #[test]
    fn and_matches_both(l in arb_condition(), r in arb_condition(), request in arb_request()) {
        let expected = l.matches(&request) && r.matches(&request);
        prop_assert_eq!((l & r).matches(&request), expected);
    }

    #[test]
    fn or_matches_either(l in arb_condition(), r in arb_condition(), request in arb_request()) {
        let expected = l.matches(&request) || r.matches(&request);
        prop_assert_eq!((l | r).matches(&request), expected);
    }

    #[test]
    fn not_inverts(c in arb_condition(), request in arb_request()) {
        let expected = !c.matches(&request);
        prop_assert_eq!((!c).matches(&request), expected);
    }

    #[test]
    fn trace_agrees_with_matches(c in arb_condition(), request in arb_request()) {
        prop_assert_eq!(c.trace(&request).matched(), c.matches(&request));
    }

    #[test]
    fn builder_order_does_not_change_outcome(
        order in Just(STEPS.to_vec()).prop_shuffle(),
        request in arb_request(),
    ) {
        let canonical = STEPS.iter().fold(stub(), |s, step| apply(s, *step));
        let shuffled = order.iter().fold(stub(), |s, step| apply(s, *step));
        let conjunction = STEPS
            .iter()
            .map(|step| apply(stub(), *step).condition().clone())
            .fold(Condition::Always, |acc, c| acc & c);

        prop_assert_eq!(shuffled.matches(&request), canonical.matches(&request));
        prop_assert_eq!(conjunction.matches(&request), canonical.matches(&request));
    }

    #[test]
    fn first_registered_match_wins(request in arb_request()) {
        let registry = stub_networking::StubRegistry::new();
        registry.register(stub().host("a.example").respond_status(201));
        registry.register(stub().method(Method::Get).respond_status(202));
        registry.register(stub().respond_status(203));

        let status = registry.resolve(&request).unwrap().status;
        let expected = if request.host() == Some("a.example") {
            201
        } else if request.method() == &Method::Get {
            202
        } else {
            203
        };
        prop_assert_eq!(status, expected);
    }
}

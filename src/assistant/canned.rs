const CANNED: &[(&[&str], &str)] = &[
    (
        &["pay", "escrow", "refund", "money"],
        "Payments are held in escrow until you confirm the job is done. \
         If something goes wrong you can open a dispute before releasing the funds.",
    ),
    (
        &["subscri", "premium", "plan"],
        "A Helpa subscription unlocks service bookings and expert consultations for 30 days.",
    ),
    (
        &["helpa", "provider", "earn", "join"],
        "Anyone with a skill can become a Helpa. Register your business profile, \
         list your services and get paid through escrow.",
    ),
    (
        &["recipe", "food", "meal", "menu"],
        "Browse the menu from the main menu to order meals to your door.",
    ),
    (
        &["hello", "hi", "hey"],
        "Hi! I can help you hire a Helpa, talk to an expert or order a meal.",
    ),
];

const DEFAULT_REPLY: &str =
    "I'm not sure about that yet. Pick an option from the menu or type 'menu' to start over.";

/// Static reply for `message`, chosen by the first keyword group that matches.
pub fn canned_response(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    CANNED
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}

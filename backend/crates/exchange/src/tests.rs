//! Unit tests for the exchange crate
//! Use cases and routes run against the in-memory store.

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use auth::User;
    use auth::domain::repository::UserRepository;
    use auth::domain::value_object::{DisplayName, Email, RawPassword, UserPassword};

    use crate::application::{
        AddSkillInput, AddSkillUseCase, ExchangeConfig, RequestSessionUseCase,
        UpdateSessionStatusUseCase,
    };
    use crate::domain::entity::{Session, Skill};
    use crate::domain::value_object::UserId;
    use crate::infra::memory::MemoryStore;

    pub const PASSWORD: &str = "Guitar#Lessons42";

    pub struct World {
        pub store: Arc<MemoryStore>,
        pub config: Arc<ExchangeConfig>,
    }

    impl World {
        pub fn new() -> Self {
            Self::with_config(ExchangeConfig::default())
        }

        pub fn with_config(config: ExchangeConfig) -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                config: Arc::new(config),
            }
        }

        pub async fn member(&self, email: &str, name: &str) -> UserId {
            let raw = RawPassword::new(PASSWORD.to_string()).unwrap();
            let user = User::new(
                Email::new(email).unwrap(),
                DisplayName::new(name).unwrap(),
                UserPassword::from_raw(&raw, None).unwrap(),
            );
            self.store.create_user(&user).await.unwrap();
            user.user_id
        }

        pub async fn skill(&self, teacher: &UserId, name: &str) -> Skill {
            AddSkillUseCase::new(self.store.clone())
                .execute(
                    teacher,
                    AddSkillInput {
                        owner_id: *teacher,
                        name: name.to_string(),
                        description: format!("Learn {name}"),
                    },
                )
                .await
                .unwrap()
        }

        pub async fn request(&self, learner: &UserId, skill: &Skill) -> Session {
            RequestSessionUseCase::new(self.store.clone())
                .execute(learner, &skill.skill_id, &skill.teacher_id)
                .await
                .unwrap()
        }

        pub fn update(&self) -> UpdateSessionStatusUseCase<MemoryStore> {
            UpdateSessionStatusUseCase::new(self.store.clone(), self.config.clone())
        }

        /// Alice teaches Guitar, Bob has an accepted session with her
        pub async fn accepted_lesson(&self) -> (UserId, UserId, Session) {
            let alice = self.member("alice@example.com", "Alice").await;
            let bob = self.member("bob@example.com", "Bob").await;
            let guitar = self.skill(&alice, "Guitar").await;
            let session = self.request(&bob, &guitar).await;
            let session = self
                .update()
                .execute(&alice, &session.session_id, "accepted")
                .await
                .unwrap();
            (alice, bob, session)
        }
    }
}

#[cfg(test)]
mod session_tests {
    use chrono::Utc;

    use super::support::World;
    use crate::application::{CreditLedgerUseCase, ExchangeConfig, ListSessionsUseCase};
    use crate::domain::entity::CreditTerms;
    use crate::domain::repository::SessionRepository;
    use crate::domain::value_object::{SessionStatus, TransactionKind};
    use crate::error::ExchangeError;

    #[tokio::test]
    async fn test_completion_transfers_credits() {
        let w = World::new();
        let (alice, bob, session) = w.accepted_lesson().await;

        let done = w
            .update()
            .execute(&bob, &session.session_id, "completed")
            .await
            .unwrap();
        assert_eq!(done.status, SessionStatus::Completed);
        assert!(done.completed_at.is_some());

        let ledger = CreditLedgerUseCase::new(w.store.clone(), w.config.clone());
        assert_eq!(ledger.balance(&alice).await.unwrap().balance, 105);
        assert_eq!(ledger.balance(&bob).await.unwrap().balance, 95);
        assert_eq!(w.store.cached_balance(&alice), Some(105));
        assert_eq!(w.store.cached_balance(&bob), Some(95));

        let bob_ledger = w.store.ledger_of(&bob);
        let spend = bob_ledger
            .iter()
            .find(|tx| tx.kind == TransactionKind::Spend)
            .unwrap();
        assert_eq!(spend.amount, 5);
        assert_eq!(spend.session_id, Some(session.session_id));
        assert_eq!(spend.reason, "Learned Guitar");
        assert!(spend.expires_at.is_none());

        let teach = w
            .store
            .ledger_of(&alice)
            .into_iter()
            .find(|tx| tx.session_id == Some(session.session_id))
            .unwrap();
        assert_eq!(teach.kind, TransactionKind::Earn);
        assert_eq!(
            teach.expires_at.unwrap() - teach.created_at,
            CreditTerms::default().earn_lifetime
        );
    }

    #[tokio::test]
    async fn test_completion_happens_once() {
        let w = World::new();
        let (alice, bob, session) = w.accepted_lesson().await;

        w.update()
            .execute(&alice, &session.session_id, "completed")
            .await
            .unwrap();
        let err = w
            .update()
            .execute(&bob, &session.session_id, "completed")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::InvalidTransition {
                from: SessionStatus::Completed,
                to: SessionStatus::Completed
            }
        ));
        assert_eq!(w.store.cached_balance(&bob), Some(95));
    }

    #[tokio::test]
    async fn test_losing_completion_race_is_stale() {
        let w = World::new();
        let (alice, bob, session) = w.accepted_lesson().await;
        let terms = CreditTerms::default();

        // Both parties read "accepted"; the second write finds it completed
        w.store
            .complete_session(&session.session_id, &terms, Utc::now())
            .await
            .unwrap();
        let err = w
            .store
            .complete_session(&session.session_id, &terms, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::StaleSession));
        assert_eq!(err.into_app_error().status_code(), 409);

        assert_eq!(w.store.cached_balance(&alice), Some(105));
        assert_eq!(w.store.cached_balance(&bob), Some(95));
        assert_eq!(w.store.ledger_of(&bob).len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_credits_changes_nothing() {
        let w = World::with_config(ExchangeConfig {
            credits: CreditTerms {
                signup_bonus: 3,
                ..CreditTerms::default()
            },
            demo: None,
        });
        let (alice, bob, session) = w.accepted_lesson().await;

        let err = w
            .update()
            .execute(&bob, &session.session_id, "completed")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::InsufficientCredits {
                balance: 3,
                required: 5
            }
        ));
        assert_eq!(err.into_app_error().status_code(), 409);

        let stored = w.store.find_session(&session.session_id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Accepted);
        assert_eq!(w.store.cached_balance(&bob), Some(3));
        assert_eq!(w.store.cached_balance(&alice), Some(3));
        assert_eq!(w.store.ledger_of(&bob).len(), 1);
    }

    #[tokio::test]
    async fn test_learner_cannot_accept_and_outsider_is_forbidden() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let bob = w.member("bob@example.com", "Bob").await;
        let carol = w.member("carol@example.com", "Carol").await;
        let guitar = w.skill(&alice, "Guitar").await;
        let session = w.request(&bob, &guitar).await;

        let err = w
            .update()
            .execute(&bob, &session.session_id, "accepted")
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::OnlyTeacher));

        let err = w
            .update()
            .execute(&carol, &session.session_id, "completed")
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotParticipant));

        let err = w
            .update()
            .execute(&alice, &session.session_id, "finished")
            .await
            .unwrap_err();
        assert_eq!(err.into_app_error().status_code(), 400);
    }

    #[tokio::test]
    async fn test_status_write_is_compare_and_set() {
        let w = World::new();
        let (_, _, session) = w.accepted_lesson().await;

        // A second writer still believing the session is pending loses
        let stale = w
            .store
            .update_session_status(
                &session.session_id,
                SessionStatus::Pending,
                SessionStatus::Rejected,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(stale.is_none());

        let stored = w.store.find_session(&session.session_id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Accepted);
    }

    #[tokio::test]
    async fn test_reject_is_terminal() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let bob = w.member("bob@example.com", "Bob").await;
        let guitar = w.skill(&alice, "Guitar").await;
        let session = w.request(&bob, &guitar).await;

        w.update()
            .execute(&alice, &session.session_id, "rejected")
            .await
            .unwrap();
        let err = w
            .update()
            .execute(&alice, &session.session_id, "accepted")
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_sessions_listed_for_both_parties() {
        let w = World::new();
        let (alice, bob, session) = w.accepted_lesson().await;
        let carol = w.member("carol@example.com", "Carol").await;

        let list = ListSessionsUseCase::new(w.store.clone());
        for user in [alice, bob] {
            let views = list.execute(&user).await.unwrap();
            assert_eq!(views.len(), 1);
            assert_eq!(views[0].session.session_id, session.session_id);
            assert_eq!(views[0].teacher_name, "Alice");
            assert_eq!(views[0].learner_name, "Bob");
        }
        assert!(list.execute(&carol).await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod skill_tests {
    use crate::application::{
        AddSkillInput, AddSkillUseCase, BrowseSkillsUseCase, DeleteSkillUseCase,
    };
    use crate::domain::repository::SessionRepository;
    use crate::domain::value_object::{SkillId, UserId};
    use crate::error::ExchangeError;

    use super::support::World;

    fn input(owner: UserId, name: &str) -> AddSkillInput {
        AddSkillInput {
            owner_id: owner,
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_skill_names_unique_per_teacher_ignoring_case() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let bob = w.member("bob@example.com", "Bob").await;
        let add = AddSkillUseCase::new(w.store.clone());

        add.execute(&alice, input(alice, "Guitar")).await.unwrap();
        let err = add
            .execute(&alice, input(alice, "  GUITAR "))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::SkillNameTaken));

        // Another teacher may list the same skill
        add.execute(&bob, input(bob, "guitar")).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_adds_one_wins() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let add = AddSkillUseCase::new(w.store.clone());

        let (a, b) = tokio::join!(
            add.execute(&alice, input(alice, "Spanish")),
            add.execute(&alice, input(alice, "spanish")),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);

        let skills = BrowseSkillsUseCase::new(w.store.clone())
            .of_user(&alice)
            .await
            .unwrap();
        assert_eq!(skills.len(), 1);
    }

    #[tokio::test]
    async fn test_only_owner_manages_skills() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let bob = w.member("bob@example.com", "Bob").await;
        let guitar = w.skill(&alice, "Guitar").await;

        let err = AddSkillUseCase::new(w.store.clone())
            .execute(&bob, input(alice, "Drums"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotOwner));

        let delete = DeleteSkillUseCase::new(w.store.clone());
        let err = delete
            .execute(&bob, &alice, &guitar.skill_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotOwner));

        let err = delete
            .execute(&alice, &alice, &SkillId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::SkillNotFound));
    }

    #[tokio::test]
    async fn test_deleting_skill_keeps_session_history() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let bob = w.member("bob@example.com", "Bob").await;
        let guitar = w.skill(&alice, "Guitar").await;
        let session = w.request(&bob, &guitar).await;

        DeleteSkillUseCase::new(w.store.clone())
            .execute(&alice, &alice, &guitar.skill_id)
            .await
            .unwrap();

        let stored = w.store.find_session(&session.session_id).await.unwrap().unwrap();
        assert_eq!(stored.skill_id, None);
        assert_eq!(stored.skill_name, "Guitar");

        let listings = BrowseSkillsUseCase::new(w.store.clone()).all().await.unwrap();
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn test_directory_joins_teacher() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        w.skill(&alice, "Guitar").await;

        let listings = BrowseSkillsUseCase::new(w.store.clone()).all().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].teacher_name, "Alice");
        assert_eq!(listings[0].teacher_email, "alice@example.com");

        let err = BrowseSkillsUseCase::new(w.store.clone())
            .of_user(&UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::UserNotFound));
    }
}

#[cfg(test)]
mod ledger_tests {
    use chrono::Duration;

    use super::support::World;
    use crate::application::{
        AddSkillInput, AddSkillUseCase, CreditLedgerUseCase, DeleteSkillUseCase,
        ExpireCreditsUseCase, MarkReadUseCase, SendMessageInput, SendMessageUseCase,
    };
    use crate::domain::value_object::{Page, TransactionStatus, UserId};
    use crate::error::ExchangeError;

    #[tokio::test]
    async fn test_earns_expire_lazily_after_lifetime() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let ledger = CreditLedgerUseCase::new(w.store.clone(), w.config.clone());

        assert_eq!(ledger.balance(&alice).await.unwrap().balance, 100);

        w.store.age_ledger(Duration::days(179));
        assert_eq!(ledger.balance(&alice).await.unwrap().balance, 100);

        w.store.age_ledger(Duration::days(1));
        let summary = ledger.balance(&alice).await.unwrap();
        assert_eq!(summary.balance, 0);
        assert_eq!(summary.active_earned, 0);
        assert_eq!(w.store.cached_balance(&alice), Some(0));

        let (history, total) = ledger.history(&alice, &Page::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(history[0].status, TransactionStatus::Expired);
    }

    #[tokio::test]
    async fn test_expired_credits_cannot_pay_for_a_lesson() {
        let w = World::new();
        let (_, bob, session) = w.accepted_lesson().await;
        let ledger = CreditLedgerUseCase::new(w.store.clone(), w.config.clone());
        ledger.balance(&bob).await.unwrap();

        w.store.age_ledger(Duration::days(181));

        let err = w
            .update()
            .execute(&bob, &session.session_id, "completed")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::InsufficientCredits { balance: 0, .. }
        ));
    }

    #[tokio::test]
    async fn test_expiring_soon_view() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let ledger = CreditLedgerUseCase::new(w.store.clone(), w.config.clone());
        ledger.balance(&alice).await.unwrap();

        assert!(ledger.expiring(&alice).await.unwrap().is_empty());

        w.store.age_ledger(Duration::days(160));
        let expiring = ledger.expiring(&alice).await.unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].amount, 100);
        assert_eq!(ledger.balance(&alice).await.unwrap().expiring_soon, 100);
    }

    #[tokio::test]
    async fn test_sweep_expires_every_account() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let bob = w.member("bob@example.com", "Bob").await;
        let ledger = CreditLedgerUseCase::new(w.store.clone(), w.config.clone());
        ledger.balance(&alice).await.unwrap();
        ledger.balance(&bob).await.unwrap();

        w.store.age_ledger(Duration::days(200));

        let sweep = ExpireCreditsUseCase::new(w.store.clone())
            .execute()
            .await
            .unwrap();
        assert_eq!(sweep.transactions, 2);
        assert_eq!(sweep.users, 2);
        assert_eq!(w.store.cached_balance(&alice), Some(0));

        let again = ExpireCreditsUseCase::new(w.store.clone())
            .execute()
            .await
            .unwrap();
        assert_eq!(again.transactions, 0);
    }

    #[tokio::test]
    async fn test_balances_untouched_until_completion() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let bob = w.member("bob@example.com", "Bob").await;
        let ledger = CreditLedgerUseCase::new(w.store.clone(), w.config.clone());
        ledger.balance(&alice).await.unwrap();
        ledger.balance(&bob).await.unwrap();

        let untouched = |step: &str| {
            for user in [&alice, &bob] {
                assert_eq!(w.store.cached_balance(user), Some(100), "after {step}");
                assert_eq!(w.store.ledger_of(user).len(), 1, "after {step}");
            }
        };

        let guitar = w.skill(&alice, "Guitar").await;
        untouched("skill add");

        let first = w.request(&bob, &guitar).await;
        let second = w.request(&bob, &guitar).await;
        untouched("session request");

        w.update()
            .execute(&alice, &first.session_id, "accepted")
            .await
            .unwrap();
        untouched("accept");

        w.update()
            .execute(&alice, &second.session_id, "rejected")
            .await
            .unwrap();
        untouched("reject");

        let hello = SendMessageUseCase::new(w.store.clone())
            .execute(
                &bob,
                SendMessageInput {
                    receiver_id: alice,
                    text: "See you Saturday".to_string(),
                },
            )
            .await
            .unwrap();
        untouched("message send");

        MarkReadUseCase::new(w.store.clone())
            .execute(&alice, &hello.message_id)
            .await
            .unwrap();
        untouched("mark read");

        DeleteSkillUseCase::new(w.store.clone())
            .execute(&alice, &alice, &guitar.skill_id)
            .await
            .unwrap();
        untouched("skill delete");

        assert_eq!(ledger.balance(&alice).await.unwrap().balance, 100);
        assert_eq!(ledger.balance(&bob).await.unwrap().balance, 100);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_account() {
        let w = World::new();
        let ghost = UserId::new();

        let err = CreditLedgerUseCase::new(w.store.clone(), w.config.clone())
            .balance(&ghost)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::UserNotFound));
        assert_eq!(err.into_app_error().status_code(), 404);
        assert_eq!(w.store.cached_balance(&ghost), None);

        let err = AddSkillUseCase::new(w.store.clone())
            .execute(
                &ghost,
                AddSkillInput {
                    owner_id: ghost,
                    name: "Guitar".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::UserNotFound));
    }

    #[tokio::test]
    async fn test_history_pages_newest_first() {
        let w = World::new();
        let (alice, bob, session) = w.accepted_lesson().await;
        w.update()
            .execute(&bob, &session.session_id, "completed")
            .await
            .unwrap();

        let ledger = CreditLedgerUseCase::new(w.store.clone(), w.config.clone());
        let (first, total) = ledger
            .history(&alice, &Page::new(Some(1), Some(1)).unwrap())
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].reason, "Taught Guitar");

        let (second, _) = ledger
            .history(&alice, &Page::new(Some(2), Some(1)).unwrap())
            .await
            .unwrap();
        assert_eq!(second[0].reason, "Signup bonus");

        let (beyond, _) = ledger
            .history(&alice, &Page::new(Some(3), Some(1)).unwrap())
            .await
            .unwrap();
        assert!(beyond.is_empty());
    }
}

#[cfg(test)]
mod review_tests {
    use super::support::World;
    use crate::application::{SubmitReviewInput, SubmitReviewUseCase, UserReviewsUseCase};
    use crate::domain::value_object::SessionId;
    use crate::error::ExchangeError;

    fn review(session_id: SessionId, rating: i64) -> SubmitReviewInput {
        SubmitReviewInput {
            session_id,
            rating,
            text: Some("Patient teacher".to_string()),
        }
    }

    #[tokio::test]
    async fn test_review_flow() {
        let w = World::new();
        let (alice, bob, session) = w.accepted_lesson().await;
        let submit = SubmitReviewUseCase::new(w.store.clone());

        let err = submit
            .execute(&bob, review(session.session_id, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::SessionNotCompleted));

        w.update()
            .execute(&bob, &session.session_id, "completed")
            .await
            .unwrap();

        submit
            .execute(&bob, review(session.session_id, 4))
            .await
            .unwrap();
        let err = submit
            .execute(&bob, review(session.session_id, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::ReviewAlreadySubmitted));

        let (reviews, summary) = UserReviewsUseCase::new(w.store.clone())
            .execute(&alice)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.average.as_deref(), Some("4.0"));

        let json = serde_json::to_string(&reviews).unwrap();
        assert!(!json.contains(&bob.to_string()));
    }

    #[tokio::test]
    async fn test_rating_bounds_and_outsiders() {
        let w = World::new();
        let (alice, bob, session) = w.accepted_lesson().await;
        w.update()
            .execute(&alice, &session.session_id, "completed")
            .await
            .unwrap();
        let carol = w.member("carol@example.com", "Carol").await;
        let submit = SubmitReviewUseCase::new(w.store.clone());

        for rating in [0, 6] {
            let err = submit
                .execute(&bob, review(session.session_id, rating))
                .await
                .unwrap_err();
            assert_eq!(err.into_app_error().status_code(), 400);
        }

        let err = submit
            .execute(&carol, review(session.session_id, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotParticipant));

        let err = submit
            .execute(&bob, review(SessionId::new(), 5))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_no_reviews_has_null_average() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;

        let (reviews, summary) = UserReviewsUseCase::new(w.store.clone())
            .execute(&alice)
            .await
            .unwrap();
        assert!(reviews.is_empty());
        assert_eq!(summary.average, None);
    }
}

#[cfg(test)]
mod message_tests {
    use super::support::World;
    use crate::application::{InboxUseCase, MarkReadUseCase, SendMessageInput, SendMessageUseCase};
    use crate::domain::value_object::UserId;
    use crate::error::ExchangeError;

    fn to(receiver_id: UserId, text: &str) -> SendMessageInput {
        SendMessageInput {
            receiver_id,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_read_and_converse() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let bob = w.member("bob@example.com", "Bob").await;
        let send = SendMessageUseCase::new(w.store.clone());
        let inbox = InboxUseCase::new(w.store.clone());

        let hello = send.execute(&bob, to(alice, "Hi Alice")).await.unwrap();
        send.execute(&alice, to(bob, "Hi Bob")).await.unwrap();

        let (messages, unread) = inbox.inbox(&alice).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender_name, "Bob");
        assert_eq!(unread, 1);

        let mark = MarkReadUseCase::new(w.store.clone());
        let err = mark.execute(&bob, &hello.message_id).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotReceiver));

        mark.execute(&alice, &hello.message_id).await.unwrap();
        mark.execute(&alice, &hello.message_id).await.unwrap();
        assert_eq!(inbox.inbox(&alice).await.unwrap().1, 0);

        let thread = inbox.conversation(&alice, &bob).await.unwrap();
        let texts: Vec<&str> = thread.iter().map(|m| m.message.text.as_str()).collect();
        assert_eq!(texts, ["Hi Alice", "Hi Bob"]);
    }

    #[tokio::test]
    async fn test_send_rejections() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let send = SendMessageUseCase::new(w.store.clone());

        let err = send.execute(&alice, to(alice, "me")).await.unwrap_err();
        assert!(matches!(err, ExchangeError::SelfMessage));

        let err = send
            .execute(&alice, to(UserId::new(), "anyone?"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::UserNotFound));

        let bob = w.member("bob@example.com", "Bob").await;
        let err = send.execute(&alice, to(bob, "   ")).await.unwrap_err();
        assert_eq!(err.into_app_error().status_code(), 400);
    }
}

#[cfg(test)]
mod demo_tests {
    use std::sync::Arc;

    use super::support::World;
    use crate::application::{BrowseSkillsUseCase, ExchangeConfig, ResetDemoUseCase};
    use crate::error::ExchangeError;

    #[tokio::test]
    async fn test_reset_requires_key_and_reseeds() {
        let w = World::with_config(ExchangeConfig::development("letmein-demo"));
        w.member("stranger@example.com", "Stranger").await;
        let reset = ResetDemoUseCase::new(w.store.clone(), w.config.clone());

        for key in [None, Some(""), Some("wrong")] {
            let err = reset.execute(key).await.unwrap_err();
            assert!(matches!(err, ExchangeError::InvalidDemoKey));
        }

        let summary = reset.execute(Some("letmein-demo")).await.unwrap();
        assert_eq!(summary.users, 3);
        assert_eq!(summary.skills, 6);

        let listings = BrowseSkillsUseCase::new(w.store.clone()).all().await.unwrap();
        assert_eq!(listings.len(), 6);
        assert!(listings.iter().all(|l| l.teacher_email != "stranger@example.com"));
        for listing in &listings {
            assert_eq!(w.store.cached_balance(&listing.skill.teacher_id), Some(100));
        }
    }

    #[tokio::test]
    async fn test_reset_disabled_without_demo_config() {
        let w = World::new();
        let reset = ResetDemoUseCase::new(w.store.clone(), Arc::new(ExchangeConfig::default()));
        let err = reset.execute(Some("anything")).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidDemoKey));
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use auth::{AuthConfig, TokenIssuer};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::World;
    use crate::application::ExchangeConfig;
    use crate::infra::memory::MemoryStore;
    use crate::presentation::router::exchange_router_generic;

    fn router(store: &MemoryStore, config: ExchangeConfig) -> (Router, Arc<TokenIssuer>) {
        let tokens = Arc::new(TokenIssuer::new(&AuthConfig::development()));
        (
            exchange_router_generic(store.clone(), config, tokens.clone()),
            tokens,
        )
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_protected_routes_require_bearer() {
        let w = World::new();
        let (app, _) = router(&w.store, ExchangeConfig::default());

        for (method, uri) in [
            ("GET", "/sessions"),
            ("GET", "/credits/balance"),
            ("POST", "/credits/expire"),
            ("GET", "/messages"),
        ] {
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["status"], 401);
        }

        // Public reads
        let req = Request::get("/skills").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_bad_input_is_json_400() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let (app, tokens) = router(&w.store, ExchangeConfig::default());
        let token = tokens.issue(&alice).token;

        let (status, body) = send(&app, authed("GET", "/credits/history?limit=101", &token, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Limit must be between 1 and 100");

        let (status, _) = send(&app, authed("GET", "/credits/history?page=abc", &token, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            authed("POST", "/sessions", &token, Some(json!({"teacherId": alice.to_string()}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "skillId is required");

        let req = Request::get("/reviews/not-a-uuid").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_response_shape() {
        let w = World::new();
        let alice = w.member("alice@example.com", "Alice").await;
        let (app, tokens) = router(&w.store, ExchangeConfig::default());
        let token = tokens.issue(&alice).token;

        let (status, body) = send(&app, authed("GET", "/credits/history", &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["limit"], 20);
        assert_eq!(body["total"], 1);
        assert_eq!(body["transactions"][0]["type"], "earn");
        assert_eq!(body["transactions"][0]["status"], "active");
        assert_eq!(body["transactions"][0]["amount"], 100);
    }

    #[tokio::test]
    async fn test_reset_demo_mounted_only_in_demo_mode() {
        let w = World::new();
        let (app, _) = router(&w.store, ExchangeConfig::default());
        let req = Request::post("/reset-demo").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (app, _) = router(&w.store, ExchangeConfig::development("demo-key-123"));
        let req = Request::post("/reset-demo").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let req = Request::post("/reset-demo")
            .header("X-Demo-Key", "demo-key-123")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"], 3);
    }
}

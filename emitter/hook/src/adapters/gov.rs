use {
    crate::{Adapter, HookError, Result},
    emitter_types::{
        json, unix_nanos, Bech32Codec, Coins, Ctx, EvMap, GovKeeper, JsDict, Json, Msg, Proposal,
        RecordKey, Records, RequestBeginBlock, RequestEndBlock, StakingKeeper, TxHash, TxMsg,
    },
    std::{collections::BTreeSet, sync::Arc},
};

/// Status reported for proposals dropped from the deposit period. It has no
/// counterpart in [`ProposalStatus`](emitter_types::ProposalStatus).
pub const STATUS_INACTIVE: i32 = 6;

/// Weights of a vote, bucketed by option. Absent options weigh `"0"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteWeights {
    pub yes: String,
    pub abstain: String,
    pub no: String,
    pub no_with_veto: String,
    /// Number of `option:X weight:Y` entries the vote was made of.
    pub entries: usize,
}

impl Default for VoteWeights {
    fn default() -> Self {
        Self {
            yes: "0".to_string(),
            abstain: "0".to_string(),
            no: "0".to_string(),
            no_with_veto: "0".to_string(),
            entries: 0,
        }
    }
}

impl VoteWeights {
    /// Parse the `proposal_vote.option` attribute: one `option:X weight:Y`
    /// entry per line, where `X` is a vote option by name or number and `Y`
    /// a decimal, possibly quoted.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut weights = Self::default();

        for line in raw.split('\n') {
            let mut fields = line.split(' ');

            let option = fields
                .next()
                .and_then(|field| field.split(':').nth(1))
                .ok_or_else(|| HookError::VoteOption(line.to_string()))?;

            let weight = fields
                .next()
                .and_then(|field| field.split(':').nth(1))
                .map(|weight| weight.trim_matches('"').to_string())
                .ok_or_else(|| HookError::VoteOption(format!("no weight in `{line}`")))?;

            // Numeric tokens: 1 yes, 2 abstain, 3 no with veto, 4 no.
            let bucket = match option {
                "VOTE_OPTION_YES" | "yes" | "1" => &mut weights.yes,
                "VOTE_OPTION_ABSTAIN" | "abstain" | "2" => &mut weights.abstain,
                "VOTE_OPTION_NO_WITH_VETO" | "no_with_veto" | "3" => &mut weights.no_with_veto,
                "VOTE_OPTION_NO" | "no" | "4" => &mut weights.no,
                _ => return Err(HookError::VoteOption(line.to_string())),
            };

            *bucket = weight;
            weights.entries += 1;
        }

        Ok(weights)
    }
}

/// Tracks proposals, deposits and votes.
pub struct GovAdapter {
    gov: Arc<dyn GovKeeper>,
    staking: Arc<dyn StakingKeeper>,
    codec: Bech32Codec,
    voted_in_block: BTreeSet<u64>,
}

impl GovAdapter {
    pub fn new(
        gov: Arc<dyn GovKeeper>,
        staking: Arc<dyn StakingKeeper>,
        codec: Bech32Codec,
    ) -> Self {
        Self {
            gov,
            staking,
            codec,
            voted_in_block: BTreeSet::new(),
        }
    }

    fn proposal(&self, ctx: &Ctx, id: u64) -> Proposal {
        self.gov.proposal(ctx, id).unwrap_or_default()
    }

    fn new_proposal(&self, ctx: &Ctx, id: u64, msg: &TxMsg) -> Json {
        let proposal = self.proposal(ctx, id);

        let mut dict = JsDict::new();
        dict.insert("id".to_string(), json!(id));
        dict.insert("proposer".to_string(), json!(msg.first_signer()));
        dict.insert("status".to_string(), json!(proposal.status as i32));
        dict.insert("submit_time".to_string(), json!(unix_nanos(&proposal.submit_time)));
        dict.insert(
            "deposit_end_time".to_string(),
            json!(unix_nanos(&proposal.deposit_end_time)),
        );
        dict.insert("total_deposit".to_string(), json!(proposal.total_deposit));
        dict.insert("yes".to_string(), json!(0));
        dict.insert("no".to_string(), json!(0));
        dict.insert("abstain".to_string(), json!(0));
        dict.insert("no_with_veto".to_string(), json!(0));
        dict.insert("is_expedited".to_string(), json!(false));
        dict.insert("resolved_height".to_string(), Json::Null);

        match proposal.messages.first() {
            Some(TxMsg {
                kind: Msg::ExecLegacyContent { content },
                ..
            }) => {
                dict.insert("type".to_string(), json!(content.proposal_type));
                dict.insert("title".to_string(), json!(content.title));
                dict.insert("description".to_string(), json!(content.description));
                dict.insert("proposal_route".to_string(), json!(content.proposal_route));
                dict.insert("content".to_string(), content.json.clone());
                dict.insert("version".to_string(), json!("v1beta1"));
            },
            first => {
                let type_url = first.map(|msg| msg.type_url.as_str()).unwrap_or_default();
                let messages = proposal
                    .messages
                    .iter()
                    .map(|msg| {
                        let mut json = msg.json.clone();
                        if let Json::Object(map) = &mut json {
                            map.insert("@type".to_string(), json!(msg.type_url));
                        }
                        json
                    })
                    .collect::<Vec<_>>();

                dict.insert("type".to_string(), json!(type_url));
                dict.insert("title".to_string(), json!(proposal.metadata));
                dict.insert("description".to_string(), json!(proposal.metadata));
                dict.insert("proposal_route".to_string(), json!("gov"));
                dict.insert(
                    "content".to_string(),
                    json!({
                        "messages": messages,
                        "metadata": proposal.metadata,
                    }),
                );
                dict.insert("version".to_string(), json!("v1"));
            },
        }

        Json::Object(dict)
    }

    fn voting_period_started(&self, ctx: &Ctx, ids: &[u64], records: &mut Records) {
        for id in ids {
            let proposal = self.proposal(ctx, *id);
            records.push(
                RecordKey::UpdateProposal,
                json!({
                    "id": id,
                    "status": proposal.status as i32,
                    "voting_time": unix_nanos(&proposal.voting_start_time),
                    "voting_end_time": unix_nanos(&proposal.voting_end_time),
                }),
            );
        }
    }

    fn flush_tallies(&mut self, ctx: &Ctx, records: &mut Records) {
        for id in std::mem::take(&mut self.voted_in_block) {
            let proposal = self.proposal(ctx, id);
            let tally = self.gov.tally(ctx, &proposal);

            records.push(
                RecordKey::UpdateProposal,
                json!({
                    "id": id,
                    "yes": tally.yes_count,
                    "no": tally.no_count,
                    "abstain": tally.abstain_count,
                    "no_with_veto": tally.no_with_veto_count,
                }),
            );
        }
    }
}

fn parse_id(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| HookError::Fatal(format!("proposal id `{raw}` is not an integer")))
}

impl Adapter for GovAdapter {
    fn after_begin_block(
        &mut self,
        _ctx: &Ctx,
        _req: &RequestBeginBlock,
        _ev_map: &EvMap,
        _records: &mut Records,
    ) -> Result<()> {
        self.voted_in_block.clear();

        Ok(())
    }

    fn handle_msg_events(
        &mut self,
        ctx: &Ctx,
        tx_hash: &TxHash,
        msg: &TxMsg,
        ev_map: &EvMap,
        detail: &mut JsDict,
        records: &mut Records,
    ) -> Result<()> {
        let mut submitted_id = 0;
        if let Some(ids) = ev_map.u64s("submit_proposal", "proposal_id")? {
            for id in ids {
                submitted_id = id;
                records.push(RecordKey::NewProposal, self.new_proposal(ctx, id, msg));
            }
        }

        if let Some(deposits) = ev_map.paired("proposal_deposit", "proposal_id", "amount")? {
            for (id, amount) in deposits {
                let id = parse_id(id)?;
                let amount = amount.parse::<Coins>()?;

                records.push(
                    RecordKey::NewProposalDeposit,
                    json!({
                        "proposal_id": id,
                        "tx_hash": tx_hash,
                        "depositor": msg.first_signer(),
                        "amount": amount,
                    }),
                );

                let proposal = self.proposal(ctx, id);
                records.push(
                    RecordKey::UpdateProposal,
                    json!({
                        "id": id,
                        "total_deposit": proposal.total_deposit,
                    }),
                );
            }
        }

        if let Some(ids) = ev_map.u64s("proposal_deposit", "voting_period_start")? {
            self.voting_period_started(ctx, &ids, records);
        }

        if let Some(ids) = ev_map.u64s("submit_proposal", "voting_period_start")? {
            self.voting_period_started(ctx, &ids, records);
        }

        if let Some(votes) = ev_map.paired("proposal_vote", "proposal_id", "option")? {
            for (id, option) in votes {
                let id = parse_id(id)?;
                let weights = VoteWeights::parse(option)?;
                let voter = msg.first_signer().unwrap_or_default();

                let mut vote = JsDict::new();
                vote.insert("proposal_id".to_string(), json!(id));
                vote.insert("tx_hash".to_string(), json!(tx_hash));
                vote.insert("voter".to_string(), json!(voter));
                vote.insert("is_vote_weighted".to_string(), json!(weights.entries > 1));
                vote.insert("is_validator".to_string(), json!(false));

                let validator = self
                    .codec
                    .account_to_validator(voter)
                    .ok()
                    .and_then(|operator| self.staking.validator(ctx, &operator));
                if let Some(validator) = validator {
                    vote.insert("is_validator".to_string(), json!(true));
                    vote.insert(
                        "validator_address".to_string(),
                        json!(validator.operator_address),
                    );
                }

                vote.insert("yes".to_string(), json!(weights.yes));
                vote.insert("no".to_string(), json!(weights.no));
                vote.insert("abstain".to_string(), json!(weights.abstain));
                vote.insert("no_with_veto".to_string(), json!(weights.no_with_veto));

                records.push(RecordKey::NewProposalVote, Json::Object(vote));
                self.voted_in_block.insert(id);
            }
        }

        match &msg.kind {
            Msg::SubmitProposal => {
                detail.insert("proposal_id".to_string(), json!(submitted_id));
            },
            Msg::Deposit { proposal_id }
            | Msg::Vote { proposal_id }
            | Msg::VoteWeighted { proposal_id } => {
                let proposal = self.proposal(ctx, *proposal_id);
                detail.insert("title".to_string(), json!(proposal.metadata));
            },
            _ => {},
        }

        Ok(())
    }

    fn after_end_block(
        &mut self,
        ctx: &Ctx,
        _req: &RequestEndBlock,
        ev_map: &EvMap,
        records: &mut Records,
    ) -> Result<()> {
        if let Some(ids) = ev_map.u64s("active_proposal", "proposal_id")? {
            for id in ids {
                let proposal = self.proposal(ctx, id);
                records.push(
                    RecordKey::UpdateProposal,
                    json!({
                        "id": id,
                        "status": proposal.status as i32,
                        "resolved_height": ctx.block_height,
                    }),
                );
            }
        }

        if let Some(ids) = ev_map.u64s("inactive_proposal", "proposal_id")? {
            for id in ids {
                records.push(
                    RecordKey::UpdateProposal,
                    json!({
                        "id": id,
                        "status": STATUS_INACTIVE,
                        "resolved_height": ctx.block_height,
                    }),
                );
            }
        }

        self.flush_tallies(ctx, records);

        Ok(())
    }
}

// ----------------------------------- tests -----------------------------------

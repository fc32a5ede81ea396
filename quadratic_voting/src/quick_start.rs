/*!

# Quick start

This example walks through analyzing a small quadratic-voting event end to
end with the `qvtally` command line tool.

**Describing the event** Create a file `budget.json` with the event identity
and its options:

```json
{
  "eventId": "community-budget-2024",
  "title": "Community budget 2024",
  "options": [
    { "id": "bike_lanes", "title": "Bike lanes", "position": 1 },
    { "id": "new_park", "title": "New park", "position": 2 },
    { "id": "library", "title": "Library hours", "position": 3 }
  ]
}
```

**Collecting the votes** Each participant receives an invite code and
distributes a credit budget over the options; the platform stores one record
per code. Export those records to `votes.json`:

```json
[
  {
    "inviteCode": "a8x-41",
    "allocations": { "bike_lanes": 49, "new_park": 25 },
    "totalCreditsUsed": 74,
    "submittedAt": "2024-05-01T10:12:30Z",
    "ipAddress": "203.0.113.7"
  },
  {
    "inviteCode": "b2k-07",
    "allocations": { "new_park": 64 },
    "totalCreditsUsed": 64,
    "submittedAt": "2024-05-01T11:03:11Z"
  }
]
```

Vote records can also be read from CSV or Excel files with
`--input-type csv` / `--input-type xlsx`; there the first row names the
option-id columns and each following row is one vote
(`invite_code, submitted_at, ip_address, <credits per option...>`).

**Running the analysis**

```bash
qvtally --config budget.json --input votes.json --out results.json
```

The summary JSON contains the quadratic tally per option, the participation
statistics, the voter/option network graph with layout coordinates, the
voting-pattern clusters, the hourly timeline, and the vote listing with IP
addresses replaced by short hashes. A spreadsheet-friendly report comes out
of `--export`:

```bash
qvtally --config budget.json --input votes.json --export report.csv
```

```text
Metric,Value
Total Votes,2
Unique Voters,2
...

Option,Credits,Votes,Quadratic Score
Bike lanes,49,1,7.00
New park,89,2,9.43
Library hours,0,0,0.00
```

**Embedding the engine** Services that already hold the vote records in
memory skip the files entirely and call the library:

```
use quadratic_voting::builder::Builder;
# use quadratic_voting::AnalyticsErrors;

let mut builder = Builder::new("community-budget-2024")
    .options(&["Bike lanes".to_string(), "New park".to_string()]);
builder.add_vote_simple("a8x-41", &[("option_1".to_string(), 49)]);
let result = builder.compute()?;
assert!(result.option_aggregates[0].quadratic_score > 6.9);
# Ok::<(), AnalyticsErrors>(())
```

A store-backed service implements [`crate::EventStore`] instead and calls
[`crate::run_analytics_for_event`] per request.

*/
